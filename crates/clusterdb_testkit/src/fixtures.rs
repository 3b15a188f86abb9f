//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use clusterdb_core::{Config, Record, Store};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A file-backed store rooted in a temporary directory that is removed on drop.
pub struct TestStore {
    /// The store instance.
    pub store: Store,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestStore {
    /// Creates a store with default settings (fsync disabled for speed).
    pub fn new() -> Self {
        Self::with_config(|config| config)
    }

    /// Creates a store, letting `configure` adjust the configuration.
    ///
    /// The root directory is always the temporary directory.
    pub fn with_config(configure: impl FnOnce(Config) -> Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = configure(Config::new().sync_on_write(false)).root(temp_dir.path());
        Self {
            store: Store::new(config),
            temp_dir,
        }
    }

    /// Creates a store holding one empty cluster.
    pub async fn with_cluster(database: &str, cluster: &str) -> Self {
        let test_store = Self::new();
        test_store
            .store
            .create_database(database)
            .await
            .expect("Failed to create database");
        test_store
            .store
            .create_cluster(database, cluster)
            .await
            .expect("Failed to create cluster");
        test_store
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Returns the on-disk path of a cluster file.
    pub fn cluster_path(&self, database: &str, cluster: &str) -> PathBuf {
        self.store.config().cluster_path(database, cluster)
    }

    /// Returns the raw content of a cluster file.
    pub fn raw_cluster(&self, database: &str, cluster: &str) -> String {
        std::fs::read_to_string(self.cluster_path(database, cluster))
            .expect("Failed to read cluster file")
    }

    /// Parses a cluster file directly, bypassing the store.
    pub fn cluster_records(&self, database: &str, cluster: &str) -> Vec<Record> {
        serde_json::from_str(&self.raw_cluster(database, cluster))
            .expect("Cluster file is not an array of records")
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Converts a JSON object literal into a record.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected a JSON object, got {other}"),
    }
}
