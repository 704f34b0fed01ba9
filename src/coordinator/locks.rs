use crate::ledger::types::Book;

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PairKey {
    username: String,
    book: Book,
}

/// One async mutex per (student, book) pair, created on demand and dropped once unused.
#[derive(Default)]
pub struct PairLocks {
    locks: DashMap<PairKey, Arc<Mutex<()>>>,
}

impl PairLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other coordination is in flight for the pair.
    pub async fn acquire(&self, username: &str, book: &Book) -> PairGuard<'_> {
        let key = PairKey {
            username: username.to_string(),
            book: book.clone(),
        };

        // Clone out of the map before awaiting so no shard lock is held across the wait.
        let lock = self.locks.entry(key.clone()).or_default().value().clone();
        let guard = lock.lock_owned().await;

        PairGuard {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

pub struct PairGuard<'a> {
    locks: &'a PairLocks,
    key: PairKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PairGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
