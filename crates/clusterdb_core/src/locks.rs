//! Per-cluster write serialization.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async mutex per cluster path.
///
/// When disabled, [`ClusterLocks::lock`] returns immediately without a guard
/// and concurrent writers to one cluster race (last write wins).
///
/// Entries nobody holds or waits on are dropped on the next `lock` call, so
/// the map only tracks clusters with writers in flight.
#[derive(Debug, Default)]
pub(crate) struct ClusterLocks {
    enabled: bool,
    locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl ClusterLocks {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Waits for exclusive access to the cluster at `path`.
    ///
    /// The returned guard must be held for the whole read-transform-write cycle.
    pub(crate) async fn lock(&self, path: &Path) -> Option<OwnedMutexGuard<()>> {
        if !self.enabled {
            return None;
        }

        let lock = {
            let mut locks = self.locks.lock();
            // A count of one means only the map refers to the mutex
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(path.to_path_buf()).or_default())
        };
        Some(lock.lock_owned().await)
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn disabled_locks_never_block() {
        let locks = ClusterLocks::new(false);
        let path = Path::new("db/users.json");

        let first = locks.lock(path).await;
        let second = locks.lock(path).await;
        assert!(first.is_none());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn same_path_is_exclusive() {
        let locks = ClusterLocks::new(true);
        let path = Path::new("db/users.json");

        let guard = locks.lock(path).await;
        assert!(guard.is_some());

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock(path)).await;
        assert!(blocked.is_err());

        drop(guard);
        assert!(locks.lock(path).await.is_some());
    }

    #[tokio::test]
    async fn different_paths_are_independent() {
        let locks = ClusterLocks::new(true);

        let _users = locks.lock(Path::new("db/users.json")).await;
        let posts = tokio::time::timeout(
            Duration::from_millis(50),
            locks.lock(Path::new("db/posts.json")),
        )
        .await;
        assert!(posts.is_ok());
    }

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let locks = ClusterLocks::new(true);

        for i in 0..10 {
            let guard = locks.lock(&PathBuf::from(format!("db/c{i}.json"))).await;
            assert!(guard.is_some());
        }
        assert_eq!(locks.tracked(), 1);

        let held = locks.lock(Path::new("db/users.json")).await;
        let _other = locks.lock(Path::new("db/posts.json")).await;
        assert_eq!(locks.tracked(), 2);

        drop(held);
        let _again = locks.lock(Path::new("db/users.json")).await;
        assert_eq!(locks.tracked(), 2);
    }
}
