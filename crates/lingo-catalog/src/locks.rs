//! Per-path exclusive access.
//!
//! # Design
//! - Writers acquire a guard for the canonical catalog path before reading it,
//!   so at most one read-modify-write cycle runs per file.
//! - Readers never lock.
//! - Lock entries are held weakly and pruned once no guard references them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use async_trait::async_trait;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Grants exclusive access to a file path for the lifetime of the returned guard.
#[async_trait]
pub trait ExclusiveAccess: Send + Sync {
    /// Wait until no other guard for `path` is alive, then return one.
    async fn acquire(&self, path: &Path) -> PathGuard;
}

/// Proof of exclusive access to one path; released on drop.
#[derive(Debug)]
pub struct PathGuard {
    path: PathBuf,
    _guard: OwnedMutexGuard<()>,
}

impl PathGuard {
    /// Path this guard protects.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// In-process [`ExclusiveAccess`] backed by one async mutex per path.
#[derive(Debug, Default)]
pub struct PathLocks {
    entries: Mutex<HashMap<PathBuf, Weak<AsyncMutex<()>>>>,
}

impl PathLocks {
    /// Empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, path: &Path) -> Arc<AsyncMutex<()>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, lock| lock.strong_count() > 0);
        if let Some(lock) = entries.get(path).and_then(Weak::upgrade) {
            return lock;
        }
        let lock = Arc::new(AsyncMutex::new(()));
        entries.insert(path.to_path_buf(), Arc::downgrade(&lock));
        lock
    }

    /// Number of paths with a live guard or waiter.
    #[must_use]
    pub fn active(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| lock.strong_count() > 0)
            .count()
    }
}

#[async_trait]
impl ExclusiveAccess for PathLocks {
    async fn acquire(&self, path: &Path) -> PathGuard {
        let lock = self.lock_for(path);
        PathGuard {
            path: path.to_path_buf(),
            _guard: lock.lock_owned().await,
        }
    }
}
