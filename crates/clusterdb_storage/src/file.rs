//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

/// Suffix appended to the hidden temporary file used by [`FileBackend::write`].
const TEMP_SUFFIX: &str = ".tmp";

/// Distinguishes temporary files of concurrent writes within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A file-based storage backend.
///
/// This backend uses the OS filesystem through `tokio::fs`, so callers are
/// never blocked while I/O is pending. It holds no open handles between
/// calls: every operation opens, uses, and closes its own file.
///
/// # Durability
///
/// `write` goes through a temporary sibling file that is renamed over the
/// target, so a failed write leaves the previous content intact. With
/// `sync_on_write` enabled (the default) the temporary file is fsynced
/// before the rename and the parent directory after it. Once the rename has
/// happened the new content is in place, so a failing directory sync is only
/// logged and the write still reports success.
///
/// # Example
///
/// ```no_run
/// use clusterdb_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// # async fn example() -> clusterdb_storage::StorageResult<()> {
/// let backend = FileBackend::new();
/// backend.create_dir(Path::new("mydb")).await?;
/// backend.create_new(Path::new("mydb/users.json"), b"[]").await?;
/// backend.write(Path::new("mydb/users.json"), br#"[{"name":"rahul"}]"#).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    sync_on_write: bool,
}

impl Default for FileBackend {
    fn default() -> Self {
        Self {
            sync_on_write: true,
        }
    }
}

impl FileBackend {
    /// Creates a file backend that fsyncs every write.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether writes are fsynced before they are published.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Returns a fresh temporary path for replacing `path`.
    ///
    /// The file is a hidden sibling (`.users.json.<pid>.<n>.tmp`), unique per
    /// call so concurrent writes never share one.
    #[must_use]
    pub fn temp_path(path: &Path) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut name = std::ffi::OsString::from(".");
        if let Some(file_name) = path.file_name() {
            name.push(file_name);
        }
        name.push(format!(".{}.{n}{TEMP_SUFFIX}", std::process::id()));
        path.with_file_name(name)
    }

    async fn write_file(&self, file: &mut File, data: &[u8]) -> std::io::Result<()> {
        file.write_all(data).await?;
        file.flush().await?;
        if self.sync_on_write {
            file.sync_all().await?;
        }
        Ok(())
    }

    /// Syncs the parent directory so a rename or creation is durable.
    #[cfg(unix)]
    async fn sync_parent(&self, path: &Path) -> StorageResult<()> {
        if !self.sync_on_write {
            return Ok(());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let dir = File::open(parent).await?;
            dir.sync_all().await?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    async fn sync_parent(&self, _path: &Path) -> StorageResult<()> {
        // Directory handles cannot be fsynced on this platform
        Ok(())
    }

    /// Syncs the parent of a file that is already published.
    ///
    /// Returns false if the sync failed; the file itself is in place either way.
    async fn sync_parent_or_warn(&self, path: &Path) -> bool {
        match self.sync_parent(path).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "file published but directory sync failed"
                );
                false
            }
        }
    }
}

impl StorageBackend for FileBackend {
    async fn exists(&self, path: &Path) -> StorageResult<bool> {
        Ok(fs::try_exists(path).await?)
    }

    async fn create_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::create_dir(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        debug!(path = %path.display(), "created directory");
        Ok(())
    }

    async fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        let data = fs::read(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        trace!(path = %path.display(), bytes = data.len(), "read file");
        Ok(data)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let temp_path = Self::temp_path(path);

        let mut file = File::create(&temp_path)
            .await
            .map_err(|e| StorageError::from_io(&temp_path, e))?;
        let written = self.write_file(&mut file, data).await;
        drop(file);

        if let Err(err) = written {
            warn!(path = %temp_path.display(), error = %err, "failed to write temporary file");
            let _ = fs::remove_file(&temp_path).await;
            return Err(err.into());
        }

        if let Err(err) = fs::rename(&temp_path, path).await {
            warn!(path = %path.display(), error = %err, "failed to publish temporary file");
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::from_io(path, err));
        }

        self.sync_parent_or_warn(path).await;
        trace!(path = %path.display(), bytes = data.len(), "replaced file");
        Ok(())
    }

    async fn create_new(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        self.write_file(&mut file, data).await?;
        drop(file);

        self.sync_parent_or_warn(path).await;
        debug!(path = %path.display(), bytes = data.len(), "created file");
        Ok(())
    }

    async fn list_files(&self, dir: &Path) -> StorageResult<Vec<PathBuf>> {
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| StorageError::from_io(dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        Ok(files)
    }
}
