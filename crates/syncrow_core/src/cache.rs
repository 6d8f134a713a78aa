//! In-memory record caches.
//!
//! Caches accelerate reads and never lead the store: the table writes or
//! evicts a cache entry only after the matching statement has succeeded.
//! They are rebuilt lazily from the store after a restart.

use crate::config::{CacheConfig, MIN_CACHE_CAPACITY};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// A bounded, thread-safe LRU map from record id to `V`.
pub struct RecordCache<V> {
    inner: Mutex<LruCache<String, V>>,
}

impl<V> RecordCache<V> {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// Capacities below [`MIN_CACHE_CAPACITY`] are raised to it.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(MIN_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns true if `id` is cached. Does not touch recency.
    pub fn contains(&self, id: &str) -> bool {
        self.inner.lock().contains(id)
    }

    /// Inserts or replaces an entry, evicting the least recently used one if full.
    pub fn put(&self, id: &str, value: V) {
        self.inner.lock().put(id.to_owned(), value);
    }

    /// Removes an entry.
    pub fn remove(&self, id: &str) -> Option<V> {
        self.inner.lock().pop(id)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }
}

impl<V: Clone> RecordCache<V> {
    /// Returns a copy of the cached value and marks it most recently used.
    pub fn get(&self, id: &str) -> Option<V> {
        self.inner.lock().get(id).cloned()
    }
}

impl<V> std::fmt::Debug for RecordCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RecordCache")
            .field("len", &inner.len())
            .field("capacity", &inner.cap())
            .finish()
    }
}

/// The three caches owned by one table.
#[derive(Debug)]
pub struct TableCaches<R> {
    remote: RecordCache<R>,
    local: RecordCache<R>,
    deletion: RecordCache<()>,
}

impl<R> TableCaches<R> {
    /// Creates empty caches sized by `config`.
    pub fn new(config: &CacheConfig) -> Self {
        let config = config.effective();
        Self {
            remote: RecordCache::new(config.remote_capacity),
            local: RecordCache::new(config.local_capacity),
            deletion: RecordCache::new(config.deletion_capacity),
        }
    }

    /// Decoded remote records.
    pub fn remote(&self) -> &RecordCache<R> {
        &self.remote
    }

    /// Decoded local records.
    pub fn local(&self) -> &RecordCache<R> {
        &self.local
    }

    /// Ids known to have a tombstone.
    pub fn deletion(&self) -> &RecordCache<()> {
        &self.deletion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let cache = RecordCache::new(MIN_CACHE_CAPACITY);
        for i in 0..MIN_CACHE_CAPACITY {
            cache.put(&format!("k{i}"), i);
        }
        // touch k0 so k1 becomes the oldest
        assert_eq!(cache.get("k0"), Some(0));

        cache.put("new", 999);

        assert_eq!(cache.len(), MIN_CACHE_CAPACITY);
        assert!(cache.contains("k0"));
        assert!(!cache.contains("k1"));
        assert!(cache.contains("new"));
    }

    #[test]
    fn capacity_has_floor() {
        assert_eq!(RecordCache::<u8>::new(0).capacity(), MIN_CACHE_CAPACITY);
        assert_eq!(RecordCache::<u8>::new(10).capacity(), MIN_CACHE_CAPACITY);
        assert_eq!(RecordCache::<u8>::new(4096).capacity(), 4096);
    }

    #[test]
    fn remove_and_clear() {
        let cache = RecordCache::new(300);
        cache.put("a", "x".to_string());
        cache.put("b", "y".to_string());

        assert_eq!(cache.remove("a").as_deref(), Some("x"));
        assert!(cache.remove("a").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn table_caches_use_config() {
        let config = CacheConfig::default()
            .local_capacity(2000)
            .remote_capacity(1)
            .deletion_capacity(512);
        let caches = TableCaches::<u8>::new(&config);

        assert_eq!(caches.local().capacity(), 2000);
        assert_eq!(caches.remote().capacity(), MIN_CACHE_CAPACITY);
        assert_eq!(caches.deletion().capacity(), 512);
    }
}
