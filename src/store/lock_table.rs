//! Per-row exclusive locks
//!
//! A `LockTable` maps row keys to async mutexes. Guards are owned so a unit of
//! work can hold them across await points and release them on drop, which
//! covers commit, rollback and early returns alike.

use super::StoreError;
use dashmap::DashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Exclusive hold on one row, released when dropped
pub(crate) type RowGuard = OwnedMutexGuard<()>;

#[derive(Debug)]
pub(crate) struct LockTable<K: Eq + Hash> {
    /// Table name used in diagnostics, e.g. `accounts`
    table: &'static str,
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K> LockTable<K>
where
    K: Eq + Hash + Clone + Display,
{
    pub(crate) fn new(table: &'static str) -> Self {
        Self {
            table,
            locks: DashMap::new(),
        }
    }

    /// Row description used in logs and errors
    pub(crate) fn row_name(&self, key: &K) -> String {
        format!("{}({})", self.table, key)
    }

    /// Acquire the exclusive lock on `key`, waiting at most `timeout`
    ///
    /// Waiters are granted the lock in FIFO order (tokio's mutex is fair),
    /// so mutations of one row serialize in arrival order.
    pub(crate) async fn acquire(&self, key: &K, timeout: Duration) -> Result<RowGuard, StoreError> {
        // The map's shard lock must not be held across the await below.
        let lock = Arc::clone(
            &*self
                .locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );

        match tokio::time::timeout(timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(guard),
            Err(_) => Err(StoreError::lock_timeout(self.row_name(key), timeout)),
        }
    }
}
