//! Storage backend trait definition.

use crate::error::StorageResult;
use std::future::Future;
use std::path::{Path, PathBuf};

/// A whole-file storage backend for ClusterDB.
///
/// Backends know about paths, directories, and byte contents. They do not
/// understand clusters or records; ClusterDB owns the JSON layout.
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the last completed `write` or
///   `create_new` for that path
/// - `write` replaces the file as a unit: a concurrent or later reader sees
///   either the previous content or the new content, never a mix
/// - `create_new` fails with `AlreadyExists` instead of overwriting
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::FileBackend`] - For persistent storage
/// - [`super::InMemoryBackend`] - For testing
pub trait StorageBackend: Send + Sync {
    /// Returns true if a file or directory exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined (e.g. permissions).
    fn exists(&self, path: &Path) -> impl Future<Output = StorageResult<bool>> + Send;

    /// Creates the directory at `path`.
    ///
    /// Missing parent directories are created as well, but the final
    /// component must not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if `path` exists, or an I/O error.
    fn create_dir(&self, path: &Path) -> impl Future<Output = StorageResult<()>> + Send;

    /// Reads the entire file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file does not exist, or an I/O error.
    fn read(&self, path: &Path) -> impl Future<Output = StorageResult<Vec<u8>>> + Send;

    /// Replaces the entire file at `path` with `data`.
    ///
    /// The file is created if it does not exist; its parent directory must.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory is missing or an I/O
    /// error occurs. On error the previous content is left in place.
    fn write(&self, path: &Path, data: &[u8]) -> impl Future<Output = StorageResult<()>> + Send;

    /// Creates a new file at `path` holding `data`.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if anything exists at `path`, or an I/O error.
    fn create_new(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl Future<Output = StorageResult<()>> + Send;

    /// Lists the paths of the regular files directly inside `dir`.
    ///
    /// Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `dir` does not exist, or an I/O error.
    fn list_files(&self, dir: &Path) -> impl Future<Output = StorageResult<Vec<PathBuf>>> + Send;
}
