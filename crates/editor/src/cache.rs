//! Bounded memo cache for values derived from the overlay set.

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;

/// Entries kept when no capacity is given.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Memoizes derived values, evicting the least recently used entry once
/// full. Owned by the editor; nothing is shared between instances.
#[derive(Debug)]
pub struct DerivedCache<K: Hash + Eq, V> {
    entries: LruCache<K, V>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq, V: Clone> DerivedCache<K, V> {
    /// A zero capacity falls back to [`DEFAULT_CACHE_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached value for `key`, computing and storing it on a miss.
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return value.clone();
        }
        self.misses += 1;
        let value = compute();
        self.entries.put(key, value.clone());
        value
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// (hits, misses) since creation or the last [`clear`](Self::clear).
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl<K: Hash + Eq, V: Clone> Default for DerivedCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
