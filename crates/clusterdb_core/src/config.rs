//! Store configuration.

use std::path::{Path, PathBuf};

/// Default file extension of cluster files.
pub const DEFAULT_EXTENSION: &str = "json";

/// Configuration for a [`crate::Store`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory that database directories are resolved against.
    pub root: PathBuf,

    /// File extension of cluster files, without the leading dot.
    pub extension: String,

    /// Whether cluster files are written pretty-printed.
    pub pretty: bool,

    /// Whether to fsync every cluster rewrite before publishing it.
    pub sync_on_write: bool,

    /// Whether mutating operations on one cluster are serialized in-process.
    pub serialize_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            pretty: false,
            sync_on_write: true,
            serialize_writes: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the cluster file extension (a leading dot is ignored).
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Sets whether cluster files are pretty-printed.
    #[must_use]
    pub const fn pretty(mut self, value: bool) -> Self {
        self.pretty = value;
        self
    }

    /// Sets whether every rewrite is fsynced.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether writers to the same cluster are serialized.
    #[must_use]
    pub const fn serialize_writes(mut self, value: bool) -> Self {
        self.serialize_writes = value;
        self
    }

    /// Returns the directory of database `name`.
    #[must_use]
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Returns the file of cluster `cluster` in database `database`.
    #[must_use]
    pub fn cluster_path(&self, database: &str, cluster: &str) -> PathBuf {
        self.database_path(database)
            .join(format!("{cluster}.{}", self.extension))
    }

    /// Returns the cluster name of `path` if it carries the cluster extension.
    pub(crate) fn cluster_name<'a>(&self, path: &'a Path) -> Option<&'a str> {
        if path.extension()?.to_str()? != self.extension {
            return None;
        }
        path.file_stem()?.to_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.extension, "json");
        assert!(!config.pretty);
        assert!(config.sync_on_write);
        assert!(!config.serialize_writes);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .root("/data")
            .extension(".db")
            .pretty(true)
            .sync_on_write(false)
            .serialize_writes(true);

        assert_eq!(config.root, PathBuf::from("/data"));
        assert_eq!(config.extension, "db");
        assert!(config.pretty);
        assert!(!config.sync_on_write);
        assert!(config.serialize_writes);
    }

    #[test]
    fn paths_are_correct() {
        let config = Config::new().root("/data");

        assert_eq!(config.database_path("mydb"), PathBuf::from("/data/mydb"));
        assert_eq!(
            config.cluster_path("mydb", "users"),
            PathBuf::from("/data/mydb/users.json")
        );
    }

    #[test]
    fn cluster_name_from_path() {
        let config = Config::new();

        assert_eq!(config.cluster_name(Path::new("mydb/users.json")), Some("users"));
        assert_eq!(config.cluster_name(Path::new("mydb/.users.json.tmp")), None);
        assert_eq!(config.cluster_name(Path::new("mydb/notes.txt")), None);
    }
}
