//! Keyed async mutex: one lock per key, no global lock.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap<K> = DashMap<K, Arc<Mutex<()>>>;

/// A registry of async mutexes keyed by `K`.
///
/// Holders of different keys never contend. Entries are created on first
/// use and dropped again once no holder or waiter remains, so the map only
/// ever contains keys that are in use.
#[derive(Debug)]
pub struct KeyedMutex<K: Eq + Hash> {
    locks: Arc<LockMap<K>>,
}

impl<K> KeyedMutex<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Acquire the lock for `key`, waiting for the current holder if any.
    pub async fn lock(&self, key: K) -> KeyedGuard<K> {
        // The shard guard returned by `entry` must be gone before awaiting.
        let mutex = {
            let entry = self
                .locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
        };
        let guard = mutex.lock_owned().await;

        KeyedGuard {
            key,
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no key is currently locked or awaited.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K> Default for KeyedMutex<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Guard returned by [`KeyedMutex::lock`]. The lock is released on drop.
#[derive(Debug)]
pub struct KeyedGuard<K: Eq + Hash> {
    key: K,
    locks: Arc<LockMap<K>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash> Drop for KeyedGuard<K> {
    fn drop(&mut self) {
        // Map entry plus this guard: nobody else holds or awaits the key.
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 2);
        self.guard.take();
    }
}
