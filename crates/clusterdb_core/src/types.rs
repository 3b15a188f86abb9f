//! Core type definitions for ClusterDB.

use std::fmt;

/// Success value of lifecycle and mutating operations.
///
/// Displays as the human-readable confirmation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confirmation {
    /// A database directory was created.
    DatabaseCreated,
    /// A cluster file was created empty.
    ClusterCreated,
    /// Records matching an update predicate were patched.
    Updated {
        /// Number of records the predicate selected.
        matched: usize,
    },
    /// Records matching a delete predicate were removed.
    Deleted {
        /// Number of records removed.
        removed: usize,
    },
}

impl Confirmation {
    /// Returns the confirmation message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::DatabaseCreated => "Database created successfully",
            Self::ClusterCreated => "cluster created successfully",
            Self::Updated { .. } => "Data updated successfully",
            Self::Deleted { .. } => "Data deleted successfully",
        }
    }
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
