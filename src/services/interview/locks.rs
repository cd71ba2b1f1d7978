//! Per-Session Locks
//!
//! Serializes the read-mutate-write cycle of each session id. Different ids
//! never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct SessionLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`
    pub async fn lock(&self, session_id: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await
        let mutex = self
            .locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Drop the entry for `session_id` unless another task holds or awaits
    /// its mutex. Call after the caller's own guard is dropped.
    pub fn release_if_idle(&self, session_id: &str) {
        self.locks
            .remove_if(session_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
