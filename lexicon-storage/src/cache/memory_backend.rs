//! In-memory cache backend with capacity and TTL bounds.

use super::traits::{CacheBackend, CacheStats};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// In-memory cache backend.
///
/// Entries expire after `ttl` (a zero TTL disables expiry) and the map is
/// bounded by `capacity`. When an insert finds the map full, expired
/// entries are purged first and, if the map is still full, an arbitrary
/// entry is evicted.
#[derive(Debug)]
pub struct MemoryCacheBackend<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    capacity: usize,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V: Clone + Send + Sync> MemoryCacheBackend<V> {
    /// Create a backend with the given capacity and TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn is_expired(&self, entry: &Entry<V>) -> bool {
        !self.ttl.is_zero() && entry.inserted_at.elapsed() > self.ttl
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Entry<V>>> {
        // Cached data is disposable; recover the map rather than panic if a
        // writer panicked mid-update.
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<V: Clone + Send + Sync> CacheBackend<V> for MemoryCacheBackend<V> {
    fn get(&self, key: &str) -> Option<V> {
        let expired = {
            let entries = self.read();
            match entries.get(key) {
                Some(entry) if !self.is_expired(entry) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            self.write().remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn put(&self, key: String, value: V) {
        let mut entries = self.write();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, entry| !self.is_expired(entry));
            if entries.len() >= self.capacity {
                // Capacity pressure with nothing expired: evict an
                // arbitrary entry to stay within bounds.
                if let Some(victim) = entries.keys().next().cloned() {
                    entries.remove(&victim);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn remove(&self, key: &str) {
        self.write().remove(key);
    }

    fn clear(&self) {
        self.write().clear();
    }

    fn len(&self) -> usize {
        self.read().len()
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.read().len() as u64,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
