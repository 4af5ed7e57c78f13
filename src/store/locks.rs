//! Per-collection mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::model::CollectionId;

/// One mutex per collection, created on first use.
///
/// Draft creation, edits, publish, and discard for the same collection run
/// under its mutex; different collections proceed independently.
#[derive(Default)]
pub struct CollectionLocks {
    locks: Mutex<HashMap<CollectionId, Arc<Mutex<()>>>>,
}

impl CollectionLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `collection`.
    pub fn with<T>(&self, collection: &CollectionId, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(collection.clone()).or_default())
        };
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn same_collection_runs_one_at_a_time() {
        let locks = Arc::new(CollectionLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (locks, inside, max_seen) =
                    (Arc::clone(&locks), Arc::clone(&inside), Arc::clone(&max_seen));
                thread::spawn(move || {
                    locks.with(&CollectionId::from("c-1"), || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
