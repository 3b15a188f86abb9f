//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The target file or directory does not exist.
    #[error("not found: {}", path.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The target file or directory already exists.
    #[error("already exists: {}", path.display())]
    AlreadyExists {
        /// The path that was about to be created.
        path: PathBuf,
    },
}

impl StorageError {
    /// Maps an I/O error for `path`, promoting the `NotFound` and
    /// `AlreadyExists` kinds to their dedicated variants.
    pub fn from_io(path: &std::path::Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => Self::Io(err),
        }
    }

    /// Returns true if the error reports a missing path.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the error reports an already existing path.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

impl From<StorageError> for io::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(e) => e,
            StorageError::NotFound { .. } => io::Error::new(io::ErrorKind::NotFound, err),
            StorageError::AlreadyExists { .. } => {
                io::Error::new(io::ErrorKind::AlreadyExists, err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn io_kinds_are_promoted() {
        let path = Path::new("db/users.json");

        let err = StorageError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());

        let err = StorageError::from_io(path, io::Error::from(io::ErrorKind::AlreadyExists));
        assert!(err.is_already_exists());

        let err = StorageError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[test]
    fn converts_back_into_io() {
        let err: io::Error = StorageError::AlreadyExists {
            path: PathBuf::from("mydb"),
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        let err: io::Error =
            StorageError::Io(io::Error::from(io::ErrorKind::PermissionDenied)).into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn display_includes_path() {
        let err = StorageError::NotFound {
            path: PathBuf::from("db/users.json"),
        };
        assert!(err.to_string().contains("db/users.json"));
    }
}
