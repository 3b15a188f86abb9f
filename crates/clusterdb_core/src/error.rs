//! Error types for ClusterDB core.

use clusterdb_storage::StorageError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in ClusterDB core operations.
///
/// Every failure belongs to one call only: nothing is retried, and the store
/// stays usable after any error.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A database or cluster was about to be created at an occupied path.
    #[error("already exists: {}", path.display())]
    AlreadyExists {
        /// The occupied path.
        path: PathBuf,
    },

    /// The targeted cluster (or database) does not exist.
    #[error("not found: {}", path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Reading a cluster file failed.
    #[error("failed to read cluster file {}: {source}", path.display())]
    ReadFailure {
        /// The cluster file.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// A cluster file does not hold a JSON array of objects.
    #[error("failed to parse cluster file {}: {source}", path.display())]
    ParseFailure {
        /// The cluster file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Writing a cluster file failed.
    #[error("failed to write cluster file {}: {source}", path.display())]
    WriteFailure {
        /// The cluster file.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// Any other I/O error, e.g. while creating a database directory.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A database or cluster name cannot be used as a path component.
    #[error("invalid {kind} name {name:?}: {reason}")]
    InvalidName {
        /// What was being named ("database" or "cluster").
        kind: &'static str,
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A value does not serialize to a JSON object.
    #[error("invalid record: expected a JSON object, got {found}")]
    InvalidRecord {
        /// The JSON type that was produced instead.
        found: &'static str,
    },

    /// Converting between records and typed values failed.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates an invalid name error.
    pub fn invalid_name(kind: &'static str, name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            kind,
            name: name.into(),
            reason,
        }
    }

    /// Creates a read failure for `path`, reporting a vanished file as `NotFound`.
    pub(crate) fn read_failure(path: PathBuf, source: StorageError) -> Self {
        if source.is_not_found() {
            Self::NotFound { path }
        } else {
            Self::ReadFailure { path, source }
        }
    }

    /// Returns true if the operation targeted a missing database or cluster.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if a create operation found its target already present.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
