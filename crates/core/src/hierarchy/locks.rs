//! In-process serialization of edits per parent.
//!
//! Reorders against the same parent queue on one async mutex; reorders
//! against different parents never contend. Operations touching several
//! parents acquire them in sorted key order so two such operations cannot
//! deadlock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::types::ParentKey;

/// Prune idle entries once the table grows past this many parents.
const PRUNE_THRESHOLD: usize = 1024;

/// Per-parent async mutexes.
#[derive(Debug, Clone, Default)]
pub struct ParentLocks {
    inner: Arc<DashMap<ParentKey, Arc<Mutex<()>>>>,
}

/// Holds the locks of every parent in an operation; released on drop.
#[derive(Debug)]
pub struct ParentGuard {
    keys: Vec<ParentKey>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl ParentGuard {
    /// Locked parents, in acquisition order.
    pub fn keys(&self) -> &[ParentKey] {
        &self.keys
    }
}

impl ParentLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks a single parent.
    pub async fn acquire(&self, key: ParentKey) -> ParentGuard {
        self.acquire_many([key]).await
    }

    /// Locks several parents in sorted order. Duplicates are locked once.
    pub async fn acquire_many<I>(&self, keys: I) -> ParentGuard
    where
        I: IntoIterator<Item = ParentKey>,
    {
        let mut keys: Vec<ParentKey> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        if self.inner.len() > PRUNE_THRESHOLD {
            self.prune();
        }

        let mut guards = Vec::with_capacity(keys.len());
        for key in &keys {
            // The map shard lock is released before awaiting the mutex.
            let mutex = Arc::clone(self.inner.entry(*key).or_default().value());
            guards.push(mutex.lock_owned().await);
        }

        ParentGuard {
            keys,
            _guards: guards,
        }
    }

    /// Drops mutexes nobody holds or waits on.
    pub fn prune(&self) {
        self.inner.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    /// Number of parents currently tracked.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no parent is tracked.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
