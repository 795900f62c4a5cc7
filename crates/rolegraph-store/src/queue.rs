//! Per-key write ordering.
//!
//! Each key gets a FIFO lock. A caller joins the queue on the first poll of
//! [`WriteQueue::turn`], so writers that are called in order are admitted in
//! order, however long each one then spends before committing. Entries are
//! dropped again once nobody holds or waits on them.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// FIFO write locks keyed by record id.
///
/// # Example
///
/// ```rust,no_run
/// use rolegraph_model::RoleId;
/// use rolegraph_store::WriteQueue;
///
/// async fn example(queue: &WriteQueue<RoleId>) {
///     let _turn = queue.turn(RoleId::new(2)).await;
///     // read, validate and write role 2; later callers wait here
/// }
/// ```
#[derive(Debug)]
pub struct WriteQueue<K> {
    slots: SyncMutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for WriteQueue<K> {
    fn default() -> Self {
        Self {
            slots: SyncMutex::new(HashMap::new()),
        }
    }
}

impl<K: Copy + Eq + Hash> WriteQueue<K> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access to `key`.
    ///
    /// The returned turn releases the key when dropped, including when the
    /// caller is cancelled while waiting or working.
    pub async fn turn(&self, key: K) -> WriteTurn<'_, K> {
        let slot = self.slot(key);
        let guard = slot.clone().lock_owned().await;
        WriteTurn {
            queue: self,
            key,
            slot,
            _guard: guard,
        }
    }

    /// Number of keys with a holder or waiter.
    pub fn active_keys(&self) -> usize {
        self.lock_slots().len()
    }

    // The table lock is synchronous and held only for the lookup, so the
    // caller is queued before `turn` first yields.
    fn slot(&self, key: K) -> Arc<Mutex<()>> {
        self.lock_slots()
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<K, Arc<Mutex<()>>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive write access to one key. Dropping it admits the next waiter.
#[derive(Debug)]
pub struct WriteTurn<'a, K: Copy + Eq + Hash> {
    queue: &'a WriteQueue<K>,
    key: K,
    slot: Arc<Mutex<()>>,
    _guard: OwnedMutexGuard<()>,
}

impl<K: Copy + Eq + Hash> Drop for WriteTurn<'_, K> {
    fn drop(&mut self) {
        let mut slots = self.queue.lock_slots();
        slots.retain(|key, slot| {
            if *key == self.key && Arc::ptr_eq(slot, &self.slot) {
                // Table, this turn and its guard: nobody else is waiting.
                Arc::strong_count(slot) > 3
            } else {
                // Left behind by a waiter that was cancelled.
                Arc::strong_count(slot) > 1
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_idle_keys_are_released() {
        let queue = WriteQueue::new();
        {
            let _turn = queue.turn(7u64).await;
            assert_eq!(queue.active_keys(), 1);
        }
        assert_eq!(queue.active_keys(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_turns_follow_call_order() {
        let queue = Arc::new(WriteQueue::new());
        let order = Arc::new(SyncMutex::new(Vec::new()));

        let worker = |label: &'static str, work: u64| {
            let queue = queue.clone();
            let order = order.clone();
            async move {
                let _turn = queue.turn(1u64).await;
                tokio::time::sleep(Duration::from_millis(work)).await;
                order.lock().unwrap().push(label);
            }
        };

        // The first caller works longest; the others must still wait for it.
        tokio::join!(worker("first", 300), worker("second", 10), worker("third", 10));

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
        assert_eq!(queue.active_keys(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_keeps_key_alive() {
        let queue = Arc::new(WriteQueue::new());
        let first = queue.turn(3u64).await;

        let waiting = {
            let queue = queue.clone();
            tokio::spawn(async move {
                let _turn = queue.turn(3u64).await;
            })
        };
        // Let the spawned task queue up behind `first`.
        tokio::time::sleep(Duration::from_millis(1)).await;

        drop(first);
        assert_eq!(queue.active_keys(), 1);

        waiting.await.unwrap();
        assert_eq!(queue.active_keys(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_is_released() {
        let queue = WriteQueue::new();
        let held = queue.turn(5u64).await;

        let attempt = tokio::time::timeout(Duration::from_millis(10), queue.turn(5u64)).await;
        assert!(attempt.is_err());

        drop(held);
        assert_eq!(queue.active_keys(), 0);
    }
}
