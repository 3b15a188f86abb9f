//! The cluster engine.
//!
//! Every operation is a self-contained cycle over one cluster file:
//!
//! ```text
//! resolve path -> check preconditions -> read + parse -> transform -> serialize + replace
//! ```
//!
//! Nothing is cached between calls. Read-only operations (query, search)
//! stop after the transform; mutating operations (insert, update, delete)
//! replace the whole file through the backend's atomic write.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::locks::ClusterLocks;
use crate::name;
use crate::record::{
    apply_patch, contains_text, from_record, same_record, to_record, Patch, Predicate, Record,
};
use crate::types::Confirmation;
use clusterdb_storage::{FileBackend, StorageBackend, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace, warn};

/// Content of a freshly created cluster.
const EMPTY_CLUSTER: &[u8] = b"[]";

/// A handle on a tree of databases and clusters.
///
/// A `Store` holds only its configuration and backend; it can be shared
/// across tasks (e.g. in an `Arc`) and every call reads the cluster file
/// afresh.
///
/// # Concurrency
///
/// Concurrent mutating calls on the same cluster race: each reads, transforms,
/// and replaces the whole file, so the last replacement wins and earlier
/// changes can be lost. Enable [`Config::serialize_writes`] to queue writers
/// per cluster within this process. Readers always observe a complete file.
///
/// # Example
///
/// ```no_run
/// use clusterdb_core::{Config, Record, Store};
/// use serde_json::json;
///
/// # async fn example() -> clusterdb_core::CoreResult<()> {
/// let store = Store::new(Config::new().root("data"));
/// store.create_database("mydb").await?;
/// store.create_cluster("mydb", "users").await?;
///
/// let user: Record = serde_json::from_value(json!({"name": "rahul", "age": 21}))?;
/// store.insert("mydb", "users", user, false).await?;
///
/// let adults = store
///     .query("mydb", "users", |r: &Record| r["age"].as_u64() >= Some(18))
///     .await?;
/// assert_eq!(adults.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Store<B: StorageBackend = FileBackend> {
    config: Config,
    backend: B,
    locks: ClusterLocks,
}

impl Store<FileBackend> {
    /// Creates a store on the OS filesystem.
    ///
    /// No filesystem access happens until the first operation.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let backend = FileBackend::new().sync_on_write(config.sync_on_write);
        Self::with_backend(config, backend)
    }
}

impl<B: StorageBackend> Store<B> {
    /// Creates a store over a custom backend.
    #[must_use]
    pub fn with_backend(config: Config, backend: B) -> Self {
        let locks = ClusterLocks::new(config.serialize_writes);
        Self {
            config,
            backend,
            locks,
        }
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the storage backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ========================================================================
    // Databases
    // ========================================================================

    /// Creates database `name` as an empty directory.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if anything exists at the database path
    /// - `InvalidName` if `name` is not a single path component
    /// - `Io` if the directory cannot be created
    pub async fn create_database(&self, name: &str) -> CoreResult<Confirmation> {
        trace!(database = name, "creating database");
        name::validate("database", name)?;
        let path = self.config.database_path(name);

        if self.backend.exists(&path).await.map_err(std::io::Error::from)? {
            warn!(path = %path.display(), "database already exists");
            return Err(CoreError::AlreadyExists { path });
        }

        match self.backend.create_dir(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "database created");
                Ok(Confirmation::DatabaseCreated)
            }
            Err(StorageError::AlreadyExists { .. }) => {
                warn!(path = %path.display(), "database already exists");
                Err(CoreError::AlreadyExists { path })
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to create database");
                Err(CoreError::Io(err.into()))
            }
        }
    }

    /// Returns true if database `name` exists.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` or `Io`.
    pub async fn database_exists(&self, name: &str) -> CoreResult<bool> {
        name::validate("database", name)?;
        let path = self.config.database_path(name);
        Ok(self.backend.exists(&path).await.map_err(std::io::Error::from)?)
    }

    // ========================================================================
    // Clusters
    // ========================================================================

    /// Creates cluster `cluster` in `database`, holding an empty array.
    ///
    /// Creation is exclusive: of two racing creators, one observes
    /// `AlreadyExists`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the cluster file exists
    /// - `WriteFailure` if the file cannot be written (including a missing
    ///   database directory)
    pub async fn create_cluster(&self, database: &str, cluster: &str) -> CoreResult<Confirmation> {
        trace!(database, cluster, "creating cluster");
        let path = self.resolve(database, cluster)?;

        match self.backend.create_new(&path, EMPTY_CLUSTER).await {
            Ok(()) => {
                debug!(path = %path.display(), "cluster created");
                Ok(Confirmation::ClusterCreated)
            }
            Err(source) if source.is_already_exists() => {
                warn!(path = %path.display(), "cluster already exists");
                Err(CoreError::AlreadyExists { path })
            }
            Err(source) => {
                error!(path = %path.display(), error = %source, "could not create the cluster");
                Err(CoreError::WriteFailure { path, source })
            }
        }
    }

    /// Returns true if `cluster` exists in `database`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` or `Io`.
    pub async fn cluster_exists(&self, database: &str, cluster: &str) -> CoreResult<bool> {
        let path = self.resolve(database, cluster)?;
        Ok(self.backend.exists(&path).await.map_err(std::io::Error::from)?)
    }

    /// Lists the clusters of `database`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the database does not exist, `InvalidName`, or `Io`.
    pub async fn list_clusters(&self, database: &str) -> CoreResult<Vec<String>> {
        name::validate("database", database)?;
        let path = self.config.database_path(database);

        let files = match self.backend.list_files(&path).await {
            Ok(files) => files,
            Err(err) if err.is_not_found() => return Err(CoreError::NotFound { path }),
            Err(err) => return Err(CoreError::Io(err.into())),
        };

        let mut names: Vec<String> = files
            .iter()
            .filter_map(|file| self.config.cluster_name(file))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Appends `record` to the end of the cluster.
    ///
    /// If an equal record (see [`same_record`]) is already stored and
    /// `allow_duplicate` is false, nothing is written and the call still
    /// succeeds.
    ///
    /// # Errors
    ///
    /// `NotFound`, `ReadFailure`, `ParseFailure`, or `WriteFailure`.
    pub async fn insert(
        &self,
        database: &str,
        cluster: &str,
        record: Record,
        allow_duplicate: bool,
    ) -> CoreResult<()> {
        trace!(database, cluster, allow_duplicate, "inserting record");
        let path = self.resolve(database, cluster)?;
        let _guard = self.locks.lock(&path).await;

        let mut records = self.load(&path).await?;
        if !allow_duplicate && records.iter().any(|existing| same_record(existing, &record)) {
            debug!(path = %path.display(), "duplicate record, skipping insert");
            return Ok(());
        }

        records.push(record);
        self.persist(&path, &records).await?;
        debug!(path = %path.display(), records = records.len(), "record inserted");
        Ok(())
    }

    /// Serializes `value` into a record and inserts it.
    ///
    /// # Errors
    ///
    /// `InvalidRecord` or `Codec` if `value` is not a JSON object, otherwise
    /// as [`Store::insert`].
    pub async fn insert_as<T: Serialize + ?Sized>(
        &self,
        database: &str,
        cluster: &str,
        value: &T,
        allow_duplicate: bool,
    ) -> CoreResult<()> {
        let record = to_record(value)?;
        self.insert(database, cluster, record, allow_duplicate).await
    }

    /// Returns the records selected by `predicate`, in cluster order.
    ///
    /// # Errors
    ///
    /// `NotFound`, `ReadFailure`, or `ParseFailure`.
    pub async fn query<P: Predicate>(
        &self,
        database: &str,
        cluster: &str,
        predicate: P,
    ) -> CoreResult<Vec<Record>> {
        self.try_query(database, cluster, |r: &Record| {
            Ok::<_, CoreError>(predicate.matches(r))
        })
        .await
    }

    /// Like [`Store::query`], with a fallible predicate.
    ///
    /// The first predicate error stops the scan and is returned unchanged.
    ///
    /// # Errors
    ///
    /// The predicate's error, or a converted [`CoreError`].
    pub async fn try_query<F, E>(
        &self,
        database: &str,
        cluster: &str,
        predicate: F,
    ) -> Result<Vec<Record>, E>
    where
        F: Fn(&Record) -> Result<bool, E>,
        E: From<CoreError>,
    {
        trace!(database, cluster, "querying cluster");
        let path = self.resolve(database, cluster)?;
        let records = self.load(&path).await?;
        let total = records.len();

        let mut matched = Vec::new();
        for record in records {
            if predicate(&record)? {
                matched.push(record);
            }
        }

        debug!(path = %path.display(), total, matched = matched.len(), "query completed");
        Ok(matched)
    }

    /// Queries the cluster and decodes every match into `T`.
    ///
    /// # Errors
    ///
    /// As [`Store::query`], or `Codec` if a match does not decode.
    pub async fn query_as<T, P>(
        &self,
        database: &str,
        cluster: &str,
        predicate: P,
    ) -> CoreResult<Vec<T>>
    where
        T: DeserializeOwned,
        P: Predicate,
    {
        self.query(database, cluster, predicate)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    /// Merges `patch` into every record selected by `predicate`.
    ///
    /// Each patch key overwrites or adds that field; other fields stay as they
    /// were. The whole cluster is rewritten in its original order.
    ///
    /// # Errors
    ///
    /// `NotFound`, `ReadFailure`, `ParseFailure`, or `WriteFailure`.
    pub async fn update<P: Predicate>(
        &self,
        database: &str,
        cluster: &str,
        predicate: P,
        patch: &Patch,
    ) -> CoreResult<Confirmation> {
        self.try_update(
            database,
            cluster,
            |r: &Record| Ok::<_, CoreError>(predicate.matches(r)),
            patch,
        )
        .await
    }

    /// Like [`Store::update`], with a fallible predicate.
    ///
    /// A predicate error aborts the update before anything is written.
    ///
    /// # Errors
    ///
    /// The predicate's error, or a converted [`CoreError`].
    pub async fn try_update<F, E>(
        &self,
        database: &str,
        cluster: &str,
        predicate: F,
        patch: &Patch,
    ) -> Result<Confirmation, E>
    where
        F: Fn(&Record) -> Result<bool, E>,
        E: From<CoreError>,
    {
        trace!(database, cluster, fields = patch.len(), "updating records");
        let path = self.resolve(database, cluster)?;
        let _guard = self.locks.lock(&path).await;

        let mut records = self.load(&path).await?;
        let mut matched = 0;
        for record in records.iter_mut() {
            if predicate(&*record)? {
                apply_patch(record, patch);
                matched += 1;
            }
        }

        self.persist(&path, &records).await?;
        debug!(path = %path.display(), matched, "records updated");
        Ok(Confirmation::Updated { matched })
    }

    /// Removes every record selected by `predicate`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `ReadFailure`, `ParseFailure`, or `WriteFailure`.
    pub async fn delete<P: Predicate>(
        &self,
        database: &str,
        cluster: &str,
        predicate: P,
    ) -> CoreResult<Confirmation> {
        self.try_delete(database, cluster, |r: &Record| {
            Ok::<_, CoreError>(predicate.matches(r))
        })
        .await
    }

    /// Like [`Store::delete`], with a fallible predicate.
    ///
    /// A predicate error aborts the delete before anything is written.
    ///
    /// # Errors
    ///
    /// The predicate's error, or a converted [`CoreError`].
    pub async fn try_delete<F, E>(
        &self,
        database: &str,
        cluster: &str,
        predicate: F,
    ) -> Result<Confirmation, E>
    where
        F: Fn(&Record) -> Result<bool, E>,
        E: From<CoreError>,
    {
        trace!(database, cluster, "deleting records");
        let path = self.resolve(database, cluster)?;
        let _guard = self.locks.lock(&path).await;

        let records = self.load(&path).await?;
        let before = records.len();

        let mut kept = Vec::with_capacity(before);
        for record in records {
            if !predicate(&record)? {
                kept.push(record);
            }
        }
        let removed = before - kept.len();

        self.persist(&path, &kept).await?;
        debug!(path = %path.display(), removed, "records deleted");
        Ok(Confirmation::Deleted { removed })
    }

    /// Returns the records with a top-level string or number field containing
    /// `needle`, in cluster order.
    ///
    /// Nested objects and arrays are not searched.
    ///
    /// # Errors
    ///
    /// `NotFound`, `ReadFailure`, or `ParseFailure`.
    pub async fn search(
        &self,
        database: &str,
        cluster: &str,
        needle: &str,
    ) -> CoreResult<Vec<Record>> {
        trace!(database, cluster, needle, "searching cluster");
        self.query(database, cluster, |r: &Record| contains_text(r, needle))
            .await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn resolve(&self, database: &str, cluster: &str) -> CoreResult<PathBuf> {
        name::validate("database", database)?;
        name::validate("cluster", cluster)?;
        Ok(self.config.cluster_path(database, cluster))
    }

    /// Reads and parses the whole cluster at `path`.
    async fn load(&self, path: &Path) -> CoreResult<Vec<Record>> {
        let exists = self
            .backend
            .exists(path)
            .await
            .map_err(|source| CoreError::ReadFailure {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            debug!(path = %path.display(), "cluster does not exist");
            return Err(CoreError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let data = self.backend.read(path).await.map_err(|source| {
            error!(path = %path.display(), error = %source, "failed to read cluster file");
            CoreError::read_failure(path.to_path_buf(), source)
        })?;

        serde_json::from_slice(&data).map_err(|source| {
            error!(path = %path.display(), error = %source, "failed to parse cluster file");
            CoreError::ParseFailure {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Serializes `records` and replaces the cluster at `path`.
    async fn persist(&self, path: &Path, records: &[Record]) -> CoreResult<()> {
        let encoded = if self.config.pretty {
            serde_json::to_vec_pretty(records)
        } else {
            serde_json::to_vec(records)
        };
        let data = encoded.map_err(|e| CoreError::WriteFailure {
            path: path.to_path_buf(),
            source: StorageError::Io(e.into()),
        })?;

        self.backend.write(path, &data).await.map_err(|source| {
            error!(path = %path.display(), error = %source, "failed to write cluster file");
            CoreError::WriteFailure {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}
