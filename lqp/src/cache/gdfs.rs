use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use log::debug;
use ordered_float::OrderedFloat;
use parking_lot::Mutex;

/// Cache with the Greedy-Dual-Frequency-Size replacement policy.
///
/// Every entry has `priority = inflation + frequency / size`. When the cache is full, the entry
/// with the lowest priority is evicted, the least recently touched one among equals, and
/// `inflation` rises to its priority, so long unused entries age out against new ones.
pub struct GdfsCache<K, V> {
    state: Mutex<GdfsState<K, V>>,
}

/// Value and hit count of an entry, as returned by [`GdfsCache::snapshot`].
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotEntry<V> {
    pub value: V,
    pub frequency: u64,
}

struct GdfsEntry<V> {
    value: V,
    frequency: u64,
    size: f64,
    priority: f64,
    stamp: u64,
}

type QueueKey = (OrderedFloat<f64>, u64);

struct GdfsState<K, V> {
    entries: HashMap<K, GdfsEntry<V>>,
    /// Eviction order, lowest priority first.
    queue: BTreeMap<QueueKey, K>,
    capacity: usize,
    inflation: f64,
    next_stamp: u64,
}

impl<V> GdfsEntry<V> {
    fn queue_key(&self) -> QueueKey {
        (OrderedFloat(self.priority), self.stamp)
    }
}

impl<K: Hash + Eq + Clone, V> GdfsState<K, V> {
    fn stamp(&mut self) -> u64 {
        self.next_stamp += 1;
        self.next_stamp
    }

    /// Counts a hit on `key` and moves it in the eviction order.
    fn touch(&mut self, key: &K) -> Option<&mut GdfsEntry<V>> {
        let stamp = self.stamp();
        let inflation = self.inflation;
        let entry = self.entries.get_mut(key)?;

        self.queue.remove(&entry.queue_key());
        entry.frequency += 1;
        entry.priority = inflation + entry.frequency as f64 / entry.size;
        entry.stamp = stamp;
        self.queue.insert(entry.queue_key(), key.clone());
        Some(entry)
    }

    fn evict(&mut self) {
        if let Some(((priority, _), key)) = self.queue.pop_first() {
            debug!("Evicting cache entry with priority {}", priority);
            self.inflation = priority.into_inner();
            self.entries.remove(&key);
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> GdfsCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(GdfsState {
                entries: HashMap::new(),
                queue: BTreeMap::new(),
                capacity,
                inflation: 0.0,
                next_stamp: 0,
            }),
        }
    }

    /// Inserts or updates `key` with size 1.
    pub fn set(&self, key: K, value: V) {
        self.set_with_size(key, value, 1.0)
    }

    /// Inserts or updates `key`. Updating counts as a hit. `size` must be positive.
    pub fn set_with_size(&self, key: K, value: V, size: f64) {
        debug_assert!(size > 0.0, "Cache entry size must be positive");
        let mut state = self.state.lock();
        if state.capacity == 0 {
            return;
        }

        if let Some(entry) = state.entries.get_mut(&key) {
            entry.value = value;
            entry.size = size;
            state.touch(&key);
            return;
        }

        while state.entries.len() >= state.capacity {
            state.evict();
        }

        let entry = GdfsEntry {
            value,
            frequency: 1,
            size,
            priority: state.inflation + 1.0 / size,
            stamp: state.stamp(),
        };
        state.queue.insert(entry.queue_key(), key.clone());
        state.entries.insert(key, entry);
    }

    /// Looks up `key`, counting a hit when present.
    pub fn try_get(&self, key: &K) -> Option<V> {
        self.state.lock().touch(key).map(|entry| entry.value.clone())
    }

    pub fn has(&self, key: &K) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    pub fn inflation(&self) -> f64 {
        self.state.lock().inflation
    }

    /// Drops all entries, keeping capacity and inflation.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.queue.clear();
    }

    /// Changes capacity, evicting entries by priority until they fit.
    pub fn resize(&self, capacity: usize) {
        let mut state = self.state.lock();
        while state.entries.len() > capacity {
            state.evict();
        }
        state.capacity = capacity;
    }

    pub fn priority(&self, key: &K) -> Option<f64> {
        self.state.lock().entries.get(key).map(|entry| entry.priority)
    }

    /// Number of hits on `key` including its insertion, 0 when absent.
    pub fn frequency(&self, key: &K) -> u64 {
        self.state
            .lock()
            .entries
            .get(key)
            .map_or(0, |entry| entry.frequency)
    }

    /// Copies all entries without counting hits.
    pub fn snapshot(&self) -> HashMap<K, SnapshotEntry<V>> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|(key, entry)| {
                (
                    key.clone(),
                    SnapshotEntry {
                        value: entry.value.clone(),
                        frequency: entry.frequency,
                    },
                )
            })
            .collect()
    }
}
