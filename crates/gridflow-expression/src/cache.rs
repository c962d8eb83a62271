//! A small bounded compute cache used to memoize parsed expressions and
//! templates.
//!
//! Expression source strings are typically reused across many
//! executions of the same workflow node, so caching the parsed AST
//! saves a lex/parse pass per evaluation. This is deliberately a plain
//! LRU map rather than a pull from a general-purpose memory/caching
//! crate: the engine only ever needs "bounded map, evict oldest,
//! report hit/miss counts".

use std::collections::VecDeque;
use std::hash::Hash;

use gridflow_error::GridflowError;

/// Configuration for a [`ComputeCache`].
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    capacity: usize,
}

impl CacheConfig {
    /// Build a configuration with the given maximum entry count.
    ///
    /// A capacity of `0` disables caching entirely (every lookup
    /// recomputes).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Maximum number of entries retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Point-in-time hit/miss counters for a [`ComputeCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Number of lookups served from the cache.
    pub hits: u64,
    /// Number of lookups that required recomputation.
    pub misses: u64,
    /// Number of entries evicted to stay within capacity.
    pub evictions: u64,
    /// Current number of entries held.
    pub len: usize,
}

impl CacheMetrics {
    /// Fraction of lookups served from cache, in `[0.0, 1.0]`.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A bounded key/value cache that computes and stores a value on miss.
///
/// Eviction is least-recently-inserted: the entry that has sat longest
/// without being touched goes first, approximating LRU without the
/// bookkeeping of a full intrusive list.
pub struct ComputeCache<K, V> {
    capacity: usize,
    order: VecDeque<K>,
    entries: std::collections::HashMap<K, V>,
    metrics: CacheMetrics,
}

impl<K, V> ComputeCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Build a cache from a [`CacheConfig`].
    #[must_use]
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            capacity: config.capacity,
            order: VecDeque::new(),
            entries: std::collections::HashMap::new(),
            metrics: CacheMetrics::default(),
        }
    }

    /// Return the cached value for `key`, computing and storing it via
    /// `compute` on a miss.
    ///
    /// With a zero-capacity cache `compute` runs on every call and
    /// nothing is stored.
    pub fn get_or_compute(
        &mut self,
        key: K,
        compute: impl FnOnce() -> Result<V, GridflowError>,
    ) -> Result<V, GridflowError> {
        if self.capacity == 0 {
            return compute();
        }

        if let Some(value) = self.entries.get(&key) {
            self.metrics.hits += 1;
            return Ok(value.clone());
        }

        self.metrics.misses += 1;
        let value = compute()?;

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                self.metrics.evictions += 1;
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    /// Drop all cached entries, keeping the running hit/miss counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Snapshot the current hit/miss/eviction counters and entry count.
    #[must_use]
    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            len: self.entries.len(),
            ..self.metrics
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn caches_on_second_lookup() {
        let mut cache: ComputeCache<Arc<str>, i32> = ComputeCache::with_config(CacheConfig::new(4));
        let mut calls = 0;
        let key: Arc<str> = Arc::from("a");
        for _ in 0..3 {
            let v = cache
                .get_or_compute(Arc::clone(&key), || {
                    calls += 1;
                    Ok(42)
                })
                .unwrap();
            assert_eq!(v, 42);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.metrics().hits, 2);
        assert_eq!(cache.metrics().misses, 1);
    }

    #[test]
    fn evicts_oldest_entry_past_capacity() {
        let mut cache: ComputeCache<i32, i32> = ComputeCache::with_config(CacheConfig::new(2));
        cache.get_or_compute(1, || Ok(1)).unwrap();
        cache.get_or_compute(2, || Ok(2)).unwrap();
        cache.get_or_compute(3, || Ok(3)).unwrap();
        assert_eq!(cache.metrics().len, 2);
        assert_eq!(cache.metrics().evictions, 1);
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let mut cache: ComputeCache<i32, i32> = ComputeCache::with_config(CacheConfig::new(0));
        let mut calls = 0;
        for _ in 0..3 {
            cache
                .get_or_compute(1, || {
                    calls += 1;
                    Ok(1)
                })
                .unwrap();
        }
        assert_eq!(calls, 3);
    }
}
