//! # ClusterDB Core
//!
//! The JSON cluster engine for ClusterDB.
//!
//! A store is a root directory of *databases* (directories), each holding
//! *clusters*: single JSON files containing an array of records.
//!
//! ```text
//! <root>/
//! └─ <database>/
//!    ├─ users.json      # [{"name":"rahul","age":21}, ...]
//!    └─ posts.json
//! ```
//!
//! This crate provides:
//! - [`Store`] with database/cluster lifecycle and insert, query, update,
//!   delete, and search over a cluster
//! - [`Predicate`] and [`Patch`] for selecting and modifying records
//! - [`Config`] for layout, formatting, durability, and write serialization
//!
//! Each operation reads the whole cluster, transforms it in memory, and (for
//! mutations) atomically replaces the file. There are no indexes and no
//! caches.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod locks;
mod name;
mod record;
mod store;
mod types;

pub use config::{Config, DEFAULT_EXTENSION};
pub use error::{CoreError, CoreResult};
pub use record::{
    apply_patch, contains_text, from_record, same_record, to_record, All, Patch, Predicate, Record,
};
pub use store::Store;
pub use types::Confirmation;

pub use clusterdb_storage::{FileBackend, InMemoryBackend, StorageBackend, StorageError};
