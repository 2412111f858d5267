//! Keyed async mutex registry.
//!
//! One `tokio::sync::Mutex<()>` per key, created on first use and dropped
//! again once no task holds or waits for it. Callers taking several keys must
//! go through [`KeyedLocks::lock_many`], which acquires them in ascending key
//! order; combined with "user lock before product locks" this is the whole
//! deadlock-avoidance story of the cart engine.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Held lock on one key. Dropping it releases the key.
pub type KeyGuard = OwnedMutexGuard<()>;

const MIN_PRUNE_AT: usize = 64;

#[derive(Debug)]
struct Slots<K> {
    map: HashMap<K, Arc<AsyncMutex<()>>>,
    prune_at: usize,
}

#[derive(Debug)]
pub struct KeyedLocks<K> {
    slots: Mutex<Slots<K>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(Slots {
                map: HashMap::new(),
                prune_at: MIN_PRUNE_AT,
            }),
        }
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Ord + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: K) -> KeyGuard {
        self.slot(key).lock_owned().await
    }

    /// Lock every key in `keys`, sorted ascending and deduplicated.
    pub async fn lock_many(&self, keys: impl IntoIterator<Item = K>) -> Vec<KeyGuard> {
        let mut keys: Vec<K> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Number of keys currently tracked (held, awaited, or not yet pruned).
    pub fn tracked(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).map.len()
    }

    fn slot(&self, key: K) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        if slots.map.len() >= slots.prune_at {
            // Only the registry references an idle slot; clones are taken
            // under this same mutex, so nothing can be racing for it.
            slots.map.retain(|_, m| Arc::strong_count(m) > 1);
            slots.prune_at = (slots.map.len() * 2).max(MIN_PRUNE_AT);
        }

        slots.map.entry(key).or_default().clone()
    }
}
