//! Per-account critical sections
//!
//! Balance-affecting operations serialize per account so a check-then-mutate
//! sequence can never interleave with a concurrent mutation of the same
//! account. Unrelated accounts proceed fully in parallel; there is no global
//! lock.

use crate::types::AccountId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-account mutexes
#[derive(Default)]
pub struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the critical section for one account
    ///
    /// The guard is owned so it can be held across await points while the
    /// registry entry stays shared.
    pub async fn acquire(&self, id: AccountId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
