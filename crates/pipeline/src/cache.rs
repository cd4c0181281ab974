// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::trace;

type Slot<V> = Arc<AsyncMutex<Option<Arc<V>>>>;

struct CacheState<K, V> {
    slots: HashMap<K, Slot<V>>,
    order: VecDeque<K>,
}

/// Per-key result cache. Concurrent callers for the same key wait on a single
/// computation and then share its value. A failed computation leaves any
/// previous value in place.
pub struct ResultCache<K, V> {
    state: Mutex<CacheState<K, V>>,
    capacity: Option<usize>,
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send + Sync,
{
    /// `None` means unbounded.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(CacheState {
                slots: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &K) -> Slot<V> {
        let mut state = self.lock();
        if let Some(slot) = state.slots.get(key) {
            return slot.clone();
        }
        let slot: Slot<V> = Arc::new(AsyncMutex::new(None));
        state.slots.insert(key.clone(), slot.clone());
        state.order.push_back(key.clone());
        if let Some(capacity) = self.capacity {
            evict(&mut state, capacity, key);
        }
        slot
    }

    /// Returns the cached value, or runs `compute` when there is none or
    /// `refresh` is set.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: K,
        refresh: bool,
        compute: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(&key);
        let mut current = slot.lock().await;
        if !refresh {
            if let Some(value) = current.as_ref() {
                trace!("Cache hit");
                return Ok(value.clone());
            }
        }

        let value = Arc::new(compute().await?);
        *current = Some(value.clone());
        Ok(value)
    }

    /// Cached value, if present and not currently being recomputed.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = self.lock().slots.get(key)?.clone();
        let current = slot.try_lock().ok()?;
        current.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drops the oldest slots nobody else holds until within `capacity`.
fn evict<K: Eq + Hash, V>(state: &mut CacheState<K, V>, capacity: usize, keep: &K) {
    let mut i = 0;
    while state.slots.len() > capacity && i < state.order.len() {
        let key = &state.order[i];
        let idle = key != keep
            && state
                .slots
                .get(key)
                .map_or(true, |slot| Arc::strong_count(slot) == 1);
        if idle {
            if let Some(key) = state.order.remove(i) {
                state.slots.remove(&key);
            }
        } else {
            i += 1;
        }
    }
}
