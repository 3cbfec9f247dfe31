//! LEXICON Test Utilities
//!
//! Centralized test infrastructure for the LEXICON workspace:
//! - Fixture builders for common dict types and values
//! - Scripted providers (full-type, value-stream, failing, system)
//! - Fault-injecting store wrappers
//! - Log capture initialization for tests

// Re-export the reference store and core types for convenience
pub use lexicon_core::{
    DictType, DictValue, LexiconConfig, LexiconError, LexiconResult, NullPolicy, ProviderError,
    RefreshEvent, StoreError,
};
pub use lexicon_storage::MemoryStore;

use lexicon_core::DictProvider;
use lexicon_storage::DictStore;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// FIXTURES
// ============================================================================

/// Shorthand for a labeled dict value.
pub fn value(
    type_code: impl Into<String>,
    value: impl Into<String>,
    label: impl Into<String>,
) -> DictValue {
    DictValue::new(type_code, value, label)
}

/// The canonical "Status" type: `0 → Enabled`, `1 → Disabled`.
pub fn status_type() -> DictType {
    DictType::new("Status", "Status").with_children(vec![
        value("Status", "0", "Enabled"),
        value("Status", "1", "Disabled"),
    ])
}

/// A three-level tree type: `1 → 1-1 → 1-1-1` labeled `R`, `M`, `L`.
pub fn region_type() -> DictType {
    DictType::new("Region", "Region").with_children(vec![
        value("Region", "1", "R"),
        value("Region", "1-1", "M").with_parent("1"),
        value("Region", "1-1-1", "L").with_parent("1-1"),
    ])
}

/// Install a test subscriber once per process. Safe to call from every test.
pub fn init_test_logging() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
    Lazy::force(&INIT);
}

// ============================================================================
// SCRIPTED PROVIDERS
// ============================================================================

/// Provider with scripted behavior for refresh tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    name: String,
    types: Vec<DictType>,
    values: Vec<DictValue>,
    stores_full_type: bool,
    system: bool,
    fail: bool,
}

impl ScriptedProvider {
    /// Full-type provider over the given types.
    pub fn with_types(name: impl Into<String>, types: Vec<DictType>) -> Self {
        Self {
            name: name.into(),
            types,
            stores_full_type: true,
            ..Default::default()
        }
    }

    /// Value-stream provider over the given values.
    pub fn with_values(name: impl Into<String>, values: Vec<DictValue>) -> Self {
        Self {
            name: name.into(),
            values,
            stores_full_type: false,
            ..Default::default()
        }
    }

    /// Provider whose iteration always fails.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stores_full_type: true,
            fail: true,
            ..Default::default()
        }
    }

    /// Mark this as the distinguished system provider.
    pub fn as_system(mut self) -> Self {
        self.system = true;
        self
    }
}

impl DictProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_sequence(&self) -> LexiconResult<Box<dyn Iterator<Item = DictType> + Send + '_>> {
        if self.fail {
            return Err(ProviderError::IterationFailed {
                provider: self.name.clone(),
                reason: "scripted failure".to_string(),
            }
            .into());
        }
        Ok(Box::new(self.types.iter().cloned()))
    }

    fn value_sequence(&self) -> LexiconResult<Box<dyn Iterator<Item = DictValue> + Send + '_>> {
        if self.fail {
            return Err(ProviderError::IterationFailed {
                provider: self.name.clone(),
                reason: "scripted failure".to_string(),
            }
            .into());
        }
        Ok(Box::new(self.values.iter().cloned()))
    }

    fn stores_full_type(&self) -> bool {
        self.stores_full_type
    }

    fn is_system(&self) -> bool {
        self.system
    }
}

// ============================================================================
// FAULT-INJECTING STORE
// ============================================================================

/// Store wrapper that fails every operation while tripped.
///
/// Wraps any inner store; `trip()` makes all calls return
/// `StoreError::Unavailable` until `reset()`.
pub struct FlakyStore<S: DictStore> {
    inner: S,
    tripped: AtomicBool,
}

impl<S: DictStore> FlakyStore<S> {
    /// Wrap `inner`, starting healthy.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            tripped: AtomicBool::new(false),
        }
    }

    /// Start failing every operation.
    pub fn trip(&self) {
        self.tripped.store(true, Ordering::SeqCst);
    }

    /// Stop failing.
    pub fn reset(&self) {
        self.tripped.store(false, Ordering::SeqCst);
    }

    /// Get the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self) -> LexiconResult<()> {
        if self.tripped.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                reason: "tripped by test".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl<S: DictStore> DictStore for FlakyStore<S> {
    fn get_type(&self, code: &str) -> LexiconResult<Option<DictType>> {
        self.check()?;
        self.inner.get_type(code)
    }

    fn get_text(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>> {
        self.check()?;
        self.inner.get_text(type_code, value)
    }

    fn get_parent_value(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>> {
        self.check()?;
        self.inner.get_parent_value(type_code, value)
    }

    fn store_type(&self, dict_type: &DictType) -> LexiconResult<()> {
        self.check()?;
        self.inner.store_type(dict_type)
    }

    fn store_values(&self, values: &[DictValue]) -> LexiconResult<()> {
        self.check()?;
        self.inner.store_values(values)
    }

    fn store_system_type(&self, dict_type: &DictType) -> LexiconResult<()> {
        self.check()?;
        self.inner.store_system_type(dict_type)
    }

    fn system_type_keys(&self) -> LexiconResult<HashSet<String>> {
        self.check()?;
        self.inner.system_type_keys()
    }

    fn remove_type(&self, code: &str) -> LexiconResult<()> {
        self.check()?;
        self.inner.remove_type(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_shape() {
        let status = status_type();
        assert_eq!(status.children.len(), 2);
        assert_eq!(status.child("1").unwrap().label.as_deref(), Some("Disabled"));

        let region = region_type();
        assert_eq!(region.child("1-1-1").unwrap().parent_value.as_deref(), Some("1-1"));
    }

    #[test]
    fn test_flaky_store_trips_and_resets() {
        let store = FlakyStore::new(MemoryStore::new());
        store.store_type(&status_type()).unwrap();

        store.trip();
        assert!(matches!(
            store.get_text("Status", "0"),
            Err(LexiconError::Store(StoreError::Unavailable { .. }))
        ));

        store.reset();
        assert_eq!(store.get_text("Status", "0").unwrap().as_deref(), Some("Enabled"));
    }

    #[test]
    fn test_failing_provider_errors() {
        let provider = ScriptedProvider::failing("broken");
        assert!(provider.type_sequence().is_err());
        assert!(provider.value_sequence().is_err());
    }
}
