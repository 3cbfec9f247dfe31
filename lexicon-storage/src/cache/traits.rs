//! Cache backend trait and statistics.
//!
//! The resolution cache delegates storage of cached entries to a backend so
//! that eviction policy and bounds stay pluggable. Backends are bounded by
//! capacity and TTL; no particular eviction algorithm is mandated.

/// Pluggable cache backend keyed by string.
///
/// Implementations must be thread-safe; operations are synchronous and
/// infallible so they can sit in the resolution hot path without adding a
/// failure mode of their own.
pub trait CacheBackend<V: Clone + Send + Sync>: Send + Sync {
    /// Get a value, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<V>;

    /// Insert or replace a value, evicting if over capacity.
    fn put(&self, key: String, value: V);

    /// Remove a single entry.
    fn remove(&self, key: &str);

    /// Drop all entries.
    fn clear(&self);

    /// Number of live entries (expired entries may still be counted until
    /// they are touched).
    fn len(&self) -> usize;

    /// True if the backend holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usage statistics.
    fn stats(&self) -> CacheStats;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
