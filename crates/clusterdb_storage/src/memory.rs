//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Entry {
    Dir,
    File(Vec<u8>),
}

/// An in-memory storage backend.
///
/// This backend keeps a flat map of paths to directories and file contents
/// and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// Files may only be created inside a directory that was created through
/// [`StorageBackend::create_dir`] (or seeded with [`InMemoryBackend::with_dir`]),
/// matching the behavior of [`super::FileBackend`].
///
/// # Example
///
/// ```rust
/// use clusterdb_storage::{InMemoryBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let backend = InMemoryBackend::new().with_dir("db");
/// backend.write(Path::new("db/users.json"), b"[]").await.unwrap();
/// assert!(backend.exists(Path::new("db/users.json")).await.unwrap());
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: RwLock<BTreeMap<PathBuf, Entry>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a directory.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.entries.write().insert(path.into(), Entry::Dir);
        self
    }

    /// Seeds a file with raw content, bypassing all checks.
    ///
    /// Useful for testing how callers handle malformed content.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        self.entries
            .write()
            .insert(path.into(), Entry::File(data.into()));
        self
    }

    /// Returns a copy of the file content at `path`, if it is a file.
    #[must_use]
    pub fn file(&self, path: &Path) -> Option<Vec<u8>> {
        match self.entries.read().get(path) {
            Some(Entry::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    fn check_parent(entries: &BTreeMap<PathBuf, Entry>, path: &Path) -> StorageResult<()> {
        match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            None => Ok(()),
            Some(parent) => match entries.get(parent) {
                Some(Entry::Dir) => Ok(()),
                _ => Err(StorageError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("parent directory does not exist: {}", parent.display()),
                ))),
            },
        }
    }
}

impl StorageBackend for InMemoryBackend {
    async fn exists(&self, path: &Path) -> StorageResult<bool> {
        Ok(self.entries.read().contains_key(path))
    }

    async fn create_dir(&self, path: &Path) -> StorageResult<()> {
        let mut entries = self.entries.write();
        if entries.contains_key(path) {
            return Err(StorageError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        // Parents are implicit, as with create_dir_all
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(Entry::Dir);
        }
        entries.insert(path.to_path_buf(), Entry::Dir);
        Ok(())
    }

    async fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        match self.entries.read().get(path) {
            Some(Entry::File(data)) => Ok(data.clone()),
            Some(Entry::Dir) => Err(StorageError::Io(io::Error::other(format!(
                "is a directory: {}",
                path.display()
            )))),
            None => Err(StorageError::NotFound {
                path: path.to_path_buf(),
            }),
        }
    }

    async fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut entries = self.entries.write();
        Self::check_parent(&entries, path)?;
        if let Some(Entry::Dir) = entries.get(path) {
            return Err(StorageError::Io(io::Error::other(format!(
                "is a directory: {}",
                path.display()
            ))));
        }
        entries.insert(path.to_path_buf(), Entry::File(data.to_vec()));
        Ok(())
    }

    async fn create_new(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut entries = self.entries.write();
        if entries.contains_key(path) {
            return Err(StorageError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        Self::check_parent(&entries, path)?;
        entries.insert(path.to_path_buf(), Entry::File(data.to_vec()));
        Ok(())
    }

    async fn list_files(&self, dir: &Path) -> StorageResult<Vec<PathBuf>> {
        let entries = self.entries.read();
        match entries.get(dir) {
            Some(Entry::Dir) => {}
            _ => {
                return Err(StorageError::NotFound {
                    path: dir.to_path_buf(),
                })
            }
        }

        Ok(entries
            .iter()
            .filter(|(path, entry)| {
                matches!(entry, Entry::File(_)) && path.parent() == Some(dir)
            })
            .map(|(path, _)| path.clone())
            .collect())
    }
}
