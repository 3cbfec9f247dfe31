//! Two-tier resolution cache.
//!
//! Cache-aside over a `DictStore` with one positive cache and one negative
//! miss counter per lookup namespace. The miss counter is a penetration
//! guard: once a key has missed `miss_threshold` times within the negative
//! TTL window, lookups short-circuit without a store round-trip, so at most
//! `miss_threshold` calls per key reach the store per window.

use super::memory_backend::MemoryCacheBackend;
use super::traits::{CacheBackend, CacheStats};
use crate::DictStore;
use lexicon_core::{LexiconConfig, LexiconResult};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the resolution cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionCacheConfig {
    /// Miss count at which lookups short-circuit without a store
    /// round-trip.
    pub miss_threshold: u32,
    /// Capacity of each positive cache.
    pub positive_capacity: usize,
    /// TTL of positive entries. Zero disables expiry.
    pub positive_ttl: Duration,
    /// Capacity of each negative miss counter.
    pub negative_capacity: usize,
    /// TTL of negative entries. Zero disables expiry.
    pub negative_ttl: Duration,
}

impl Default for ResolutionCacheConfig {
    fn default() -> Self {
        Self::from(&LexiconConfig::default())
    }
}

impl From<&LexiconConfig> for ResolutionCacheConfig {
    fn from(config: &LexiconConfig) -> Self {
        Self {
            miss_threshold: config.miss_threshold,
            positive_capacity: config.positive_capacity,
            positive_ttl: config.positive_ttl,
            negative_capacity: config.negative_capacity,
            negative_ttl: config.negative_ttl,
        }
    }
}

impl ResolutionCacheConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the miss threshold.
    pub fn with_miss_threshold(mut self, threshold: u32) -> Self {
        self.miss_threshold = threshold;
        self
    }

    /// Set the positive cache bounds.
    pub fn with_positive_bounds(mut self, capacity: usize, ttl: Duration) -> Self {
        self.positive_capacity = capacity;
        self.positive_ttl = ttl;
        self
    }

    /// Set the negative cache bounds.
    pub fn with_negative_bounds(mut self, capacity: usize, ttl: Duration) -> Self {
        self.negative_capacity = capacity;
        self.negative_ttl = ttl;
        self
    }
}

/// One lookup namespace: a positive cache plus a negative miss counter.
struct Namespace {
    positive: Box<dyn CacheBackend<String>>,
    misses: Box<dyn CacheBackend<u32>>,
}

impl Namespace {
    fn bounded(config: &ResolutionCacheConfig) -> Self {
        Self {
            positive: Box::new(MemoryCacheBackend::new(
                config.positive_capacity,
                config.positive_ttl,
            )),
            misses: Box::new(MemoryCacheBackend::new(
                config.negative_capacity,
                config.negative_ttl,
            )),
        }
    }
}

/// Cache-aside resolution layer over a `DictStore`.
///
/// Two independent namespaces exist, one for text lookups and one for
/// parent-value lookups; both follow the same algorithm. The cache is a
/// derived, eventually-consistent view: it may serve stale data between a
/// store write and the next miss or expiry.
pub struct ResolutionCache<S: DictStore> {
    store: Arc<S>,
    text: Namespace,
    parent: Namespace,
    miss_threshold: u32,
}

impl<S: DictStore> ResolutionCache<S> {
    /// Create a resolution cache with in-memory backends sized per config.
    pub fn new(store: Arc<S>, config: ResolutionCacheConfig) -> Self {
        Self {
            text: Namespace::bounded(&config),
            parent: Namespace::bounded(&config),
            miss_threshold: config.miss_threshold,
            store,
        }
    }

    /// Create a resolution cache with caller-supplied backends.
    ///
    /// Backends are given in (text positive, text misses, parent positive,
    /// parent misses) order.
    pub fn with_backends(
        store: Arc<S>,
        text_positive: Box<dyn CacheBackend<String>>,
        text_misses: Box<dyn CacheBackend<u32>>,
        parent_positive: Box<dyn CacheBackend<String>>,
        parent_misses: Box<dyn CacheBackend<u32>>,
        miss_threshold: u32,
    ) -> Self {
        Self {
            store,
            text: Namespace {
                positive: text_positive,
                misses: text_misses,
            },
            parent: Namespace {
                positive: parent_positive,
                misses: parent_misses,
            },
            miss_threshold,
        }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Resolve the display text for `(type_code, value)`.
    pub fn resolve_text(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>> {
        self.resolve(&self.text, type_code, value, |s, t, v| s.get_text(t, v))
    }

    /// Resolve the parent value for `(type_code, value)`.
    pub fn resolve_parent(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>> {
        self.resolve(&self.parent, type_code, value, |s, t, v| {
            s.get_parent_value(t, v)
        })
    }

    /// Drop a single key from both namespaces.
    pub fn invalidate(&self, type_code: &str, value: &str) {
        let key = cache_key(type_code, value);
        self.text.positive.remove(&key);
        self.text.misses.remove(&key);
        self.parent.positive.remove(&key);
        self.parent.misses.remove(&key);
    }

    /// Drop everything, positive and negative.
    pub fn clear(&self) {
        self.text.positive.clear();
        self.text.misses.clear();
        self.parent.positive.clear();
        self.parent.misses.clear();
    }

    /// Statistics for the text namespace (positive, negative).
    pub fn text_stats(&self) -> (CacheStats, CacheStats) {
        (self.text.positive.stats(), self.text.misses.stats())
    }

    /// Statistics for the parent namespace (positive, negative).
    pub fn parent_stats(&self) -> (CacheStats, CacheStats) {
        (self.parent.positive.stats(), self.parent.misses.stats())
    }

    fn resolve(
        &self,
        namespace: &Namespace,
        type_code: &str,
        value: &str,
        fetch: impl Fn(&S, &str, &str) -> LexiconResult<Option<String>>,
    ) -> LexiconResult<Option<String>> {
        let key = cache_key(type_code, value);

        if let Some(text) = namespace.positive.get(&key) {
            return Ok(Some(text));
        }

        let miss_count = namespace.misses.get(&key).unwrap_or(0);
        if miss_count >= self.miss_threshold {
            tracing::trace!(type_code, value, miss_count, "known-missing key, store skipped");
            return Ok(None);
        }

        match fetch(self.store.as_ref(), type_code, value)? {
            Some(text) => {
                namespace.positive.put(key.clone(), text.clone());
                namespace.misses.remove(&key);
                Ok(Some(text))
            }
            None => {
                namespace.misses.put(key, miss_count + 1);
                Ok(None)
            }
        }
    }
}

fn cache_key(type_code: &str, value: &str) -> String {
    format!("{type_code}:{value}")
}

// ============================================================================
// TESTS
// ============================================================================
