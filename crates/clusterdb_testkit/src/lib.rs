//! # ClusterDB Testkit
//!
//! Test utilities for ClusterDB.
//!
//! This crate provides:
//! - Test fixtures: stores rooted in a temporary directory
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use clusterdb_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn test_with_store() {
//!     let store = TestStore::with_cluster("mydb", "users").await;
//!     store.insert("mydb", "users", record(json!({"a": 1})), false).await.unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use serde_json::json;
}

pub use fixtures::*;
pub use generators::*;
