//! # ClusterDB Storage
//!
//! Filesystem adapter for ClusterDB.
//!
//! This crate provides the lowest layer of ClusterDB. Backends are
//! **whole-file stores**: they answer existence checks, create directories,
//! and read or replace entire files. They do not interpret the bytes they
//! hold; the JSON layout of a cluster belongs to `clusterdb_core`.
//!
//! ## Design Principles
//!
//! - Every call is a fresh open/read/close or open/write/close cycle
//! - Replacing a file never leaves a partially written file behind
//! - Must be `Send + Sync` so a store can be shared across tasks
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - Persistent storage on the OS filesystem (tokio)
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//!
//! ## Example
//!
//! ```rust
//! use clusterdb_storage::{InMemoryBackend, StorageBackend};
//! use std::path::Path;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backend = InMemoryBackend::new();
//! backend.create_dir(Path::new("db")).await.unwrap();
//! backend.create_new(Path::new("db/users.json"), b"[]").await.unwrap();
//! let data = backend.read(Path::new("db/users.json")).await.unwrap();
//! assert_eq!(&data, b"[]");
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
