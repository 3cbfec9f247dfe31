//! Provider contract for dictionary entry sources.
//!
//! The trait lives here, next to the event surface, so that test fixtures
//! and alternative sources can implement it without pulling in the refresh
//! machinery.

use crate::error::LexiconResult;
use crate::types::{DictType, DictValue};

/// A source of dictionary entries swept during a full refresh.
///
/// Providers either store full types (`stores_full_type` true, iterated via
/// `type_sequence`) or stream bare values straight to the value sink
/// (`value_sequence`). A failure inside one provider is isolated and does
/// not abort the sweep of the remaining providers.
pub trait DictProvider: Send + Sync {
    /// Provider name, used in logs and error payloads.
    fn name(&self) -> &str;

    /// Lazy sequence of full dict types.
    fn type_sequence(&self) -> LexiconResult<Box<dyn Iterator<Item = DictType> + Send + '_>>;

    /// Lazy sequence of bare values, for providers that do not store full
    /// types.
    fn value_sequence(&self) -> LexiconResult<Box<dyn Iterator<Item = DictValue> + Send + '_>> {
        Ok(Box::new(std::iter::empty()))
    }

    /// Whether this provider participates in a refresh for `selector`.
    ///
    /// With no selector every provider participates; with a selector only
    /// providers matching it by name do.
    fn supports_refresh(&self, selector: Option<&str>) -> bool {
        selector.map_or(true, |s| s == self.name())
    }

    /// True if the provider supplies full dict types rather than a bare
    /// value stream.
    fn stores_full_type(&self) -> bool {
        true
    }

    /// Marker for the distinguished system provider. Types swept from it
    /// are additionally stored into the system namespace and become immune
    /// to event-driven refresh.
    fn is_system(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BareProvider;

    impl DictProvider for BareProvider {
        fn name(&self) -> &str {
            "bare"
        }

        fn type_sequence(&self) -> LexiconResult<Box<dyn Iterator<Item = DictType> + Send + '_>> {
            Ok(Box::new(std::iter::empty()))
        }
    }

    #[test]
    fn test_default_methods() {
        let provider = BareProvider;
        assert_eq!(provider.value_sequence().unwrap().count(), 0);
        assert!(provider.stores_full_type());
        assert!(!provider.is_system());
    }

    #[test]
    fn test_selector_matching() {
        let provider = BareProvider;
        assert!(provider.supports_refresh(None));
        assert!(provider.supports_refresh(Some("bare")));
        assert!(!provider.supports_refresh(Some("db")));
    }
}
