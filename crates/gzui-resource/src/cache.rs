//! Single-flight cache.
//!
//! The first caller for a key computes the value; callers arriving while
//! it runs block on the slot and receive a clone of the same result. If the
//! computing caller unwinds, the slot is abandoned and a waiter takes over.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use rustc_hash::FxHashMap;

enum State<V> {
    Pending,
    Ready(V),
    Abandoned,
}

struct Slot<V> {
    state: Mutex<State<V>>,
    ready: Condvar,
}

impl<V: Clone> Slot<V> {
    fn pending() -> Self {
        Self {
            state: Mutex::new(State::Pending),
            ready: Condvar::new(),
        }
    }

    /// Block until the slot settles. `None` means it was abandoned.
    fn wait(&self) -> Option<V> {
        let mut state = self.state.lock().expect("cache slot lock poisoned");
        while matches!(*state, State::Pending) {
            state = self.ready.wait(state).expect("cache slot lock poisoned");
        }
        match &*state {
            State::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    fn settle(&self, next: State<V>) {
        *self.state.lock().expect("cache slot lock poisoned") = next;
        self.ready.notify_all();
    }

    fn peek(&self) -> Option<V> {
        match &*self.state.lock().expect("cache slot lock poisoned") {
            State::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlightStats {
    /// Calls answered from a settled or in-flight slot.
    pub hits: u64,
    /// Calls that ran the computation.
    pub misses: u64,
}

/// Per-key cache with at most one computation in flight per key.
pub struct SingleFlight<K, V> {
    slots: Mutex<FxHashMap<K, Arc<Slot<V>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(FxHashMap::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl<K, V> std::fmt::Debug for SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value for `key`, running `compute` only if no other
    /// caller has produced or is producing it.
    pub fn get_or_insert_with<F>(&self, key: &K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let slot = loop {
            let (slot, leader) = self.claim(key);
            if leader {
                break slot;
            }
            if let Some(value) = slot.wait() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return value;
            }
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        let guard = LeaderGuard {
            flight: self,
            key,
            slot: &slot,
            settled: false,
        };
        let value = compute();
        guard.complete(value.clone());
        value
    }

    /// Settled value for `key`, without waiting.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<V> {
        let slot = self.lock().get(key).cloned()?;
        slot.peek()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget every entry. In-flight computations still finish and hand
    /// their result to their own waiters.
    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn stats(&self) -> FlightStats {
        FlightStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<K, Arc<Slot<V>>>> {
        self.slots.lock().expect("single-flight map lock poisoned")
    }

    fn claim(&self, key: &K) -> (Arc<Slot<V>>, bool) {
        let mut slots = self.lock();
        if let Some(slot) = slots.get(key) {
            return (Arc::clone(slot), false);
        }
        let slot = Arc::new(Slot::pending());
        slots.insert(key.clone(), Arc::clone(&slot));
        (slot, true)
    }

    fn abandon(&self, key: &K, slot: &Arc<Slot<V>>) {
        let mut slots = self.lock();
        if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.remove(key);
        }
        drop(slots);
        slot.settle(State::Abandoned);
    }
}

struct LeaderGuard<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    flight: &'a SingleFlight<K, V>,
    key: &'a K,
    slot: &'a Arc<Slot<V>>,
    settled: bool,
}

impl<K, V> LeaderGuard<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn complete(mut self, value: V) {
        self.slot.settle(State::Ready(value));
        self.settled = true;
    }
}

impl<K, V> Drop for LeaderGuard<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        if !self.settled {
            self.flight.abandon(self.key, self.slot);
        }
    }
}
