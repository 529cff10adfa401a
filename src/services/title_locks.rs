// src/services/title_locks.rs
//
// Per-title mutual exclusion for catalog adds.
//
// Two adds that resolve to the same (tmdb, imdb) pair serialize on one lock;
// adds for different titles never contend. Entries are removed once nobody
// holds or waits on them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Canonical identity of one title across both providers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TitleKey {
    pub tmdb: String,
    pub imdb: String,
}

#[derive(Default)]
pub struct TitleLocks {
    locks: Mutex<HashMap<TitleKey, Arc<AsyncMutex<()>>>>,
}

impl TitleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: TitleKey) -> TitleGuard<'_> {
        let slot = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        let guard = slot.lock_owned().await;

        TitleGuard {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of titles currently locked or waited on.
    pub fn active(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

pub struct TitleGuard<'a> {
    locks: &'a TitleLocks,
    key: TitleKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TitleGuard<'_> {
    fn drop(&mut self) {
        // Release the title before pruning so waiters can proceed.
        drop(self.guard.take());

        let mut locks = self.locks.locks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = locks.get(&self.key) {
            if Arc::strong_count(slot) == 1 {
                locks.remove(&self.key);
            }
        }
    }
}
