//! LEXICON Storage - Store Contract and In-Memory Reference Implementation
//!
//! Defines the persistence abstraction for dictionary types and values.
//! Resolution sits in a serialization hot path, so the contract is
//! synchronous and blocking; implementations must be safe to share across
//! threads but are not required to retry internally.

pub mod cache;
pub mod tree;

pub use cache::{
    CacheBackend, CacheStats, MemoryCacheBackend, ResolutionCache, ResolutionCacheConfig,
};
pub use tree::{TreeResolver, NULL_PLACEHOLDER};

use lexicon_core::{DictType, DictValue, LexiconResult, StoreError};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// Persistence abstraction for dictionary types and values.
///
/// A lookup miss is an absent result, never an error. Failures propagate to
/// the caller; the refresh path logs them and continues, the resolution
/// path surfaces them synchronously.
pub trait DictStore: Send + Sync {
    /// Get a dict type by code, children included.
    fn get_type(&self, code: &str) -> LexiconResult<Option<DictType>>;

    /// Resolve the display text for `(type_code, value)`.
    ///
    /// A stored tombstone is not resolvable and reads as absent.
    fn get_text(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>>;

    /// Resolve the parent value for `(type_code, value)`.
    fn get_parent_value(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>>;

    /// Store a dict type, replacing any previous children.
    fn store_type(&self, dict_type: &DictType) -> LexiconResult<()>;

    /// Upsert single value entries into their owning types.
    ///
    /// Creates a stub type when the owning type is absent. Last write wins
    /// per value key.
    fn store_values(&self, values: &[DictValue]) -> LexiconResult<()>;

    /// Store a dict type into the system namespace, marking it
    /// system-protected against the event-driven refresh surface.
    fn store_system_type(&self, dict_type: &DictType) -> LexiconResult<()>;

    /// Codes of all types in the system namespace.
    fn system_type_keys(&self) -> LexiconResult<HashSet<String>>;

    /// Remove a dict type and its value entries.
    fn remove_type(&self, code: &str) -> LexiconResult<()>;
}

// ============================================================================
// IN-MEMORY REFERENCE STORE
// ============================================================================

/// In-memory reference store.
///
/// Backed by a `RwLock`ed map of types keyed by code plus a separate system
/// namespace. Suitable for single-process deployments and as the store
/// implementation for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    types: RwLock<HashMap<String, DictType>>,
    system: RwLock<HashMap<String, DictType>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data, system namespace included.
    pub fn clear(&self) -> LexiconResult<()> {
        self.write_types()?.clear();
        self.write_system()?.clear();
        Ok(())
    }

    /// Number of stored types (system namespace excluded).
    pub fn type_count(&self) -> LexiconResult<usize> {
        Ok(self.read_types()?.len())
    }

    fn read_types(&self) -> Result<RwLockReadGuard<'_, HashMap<String, DictType>>, StoreError> {
        self.types.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_types(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, DictType>>, StoreError> {
        self.types.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_system(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, DictType>>, StoreError> {
        self.system.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl DictStore for MemoryStore {
    fn get_type(&self, code: &str) -> LexiconResult<Option<DictType>> {
        Ok(self.read_types()?.get(code).cloned())
    }

    fn get_text(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>> {
        Ok(self
            .read_types()?
            .get(type_code)
            .and_then(|t| t.child(value))
            .and_then(|c| c.label.clone()))
    }

    fn get_parent_value(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>> {
        Ok(self
            .read_types()?
            .get(type_code)
            .and_then(|t| t.child(value))
            .and_then(|c| c.parent_value.clone()))
    }

    fn store_type(&self, dict_type: &DictType) -> LexiconResult<()> {
        self.write_types()?
            .insert(dict_type.code.clone(), dict_type.clone());
        Ok(())
    }

    fn store_values(&self, values: &[DictValue]) -> LexiconResult<()> {
        let mut types = self.write_types()?;
        for value in values {
            let owner = types
                .entry(value.type_code.clone())
                .or_insert_with(|| DictType::new(value.type_code.clone(), ""));
            match owner.children.iter().position(|c| c.value == value.value) {
                Some(idx) => owner.children[idx] = value.clone(),
                None => owner.children.push(value.clone()),
            }
        }
        Ok(())
    }

    fn store_system_type(&self, dict_type: &DictType) -> LexiconResult<()> {
        let mut stored = dict_type.clone();
        stored.system = true;
        self.write_system()?.insert(stored.code.clone(), stored);
        Ok(())
    }

    fn system_type_keys(&self) -> LexiconResult<HashSet<String>> {
        Ok(self
            .system
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .keys()
            .cloned()
            .collect())
    }

    fn remove_type(&self, code: &str) -> LexiconResult<()> {
        self.write_types()?.remove(code);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
