//! Resolution caching.
//!
//! Two layers live here: a pluggable, size/TTL-bounded cache backend, and
//! the `ResolutionCache` that composes a positive cache and a negative miss
//! counter per lookup namespace (text, parent) on top of a `DictStore`.

mod memory_backend;
mod resolution;
mod traits;

pub use memory_backend::MemoryCacheBackend;
pub use resolution::{ResolutionCache, ResolutionCacheConfig};
pub use traits::{CacheBackend, CacheStats};
