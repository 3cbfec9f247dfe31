//! Built-in providers for dictionary entry sources.
//!
//! The `DictProvider` contract itself lives in `lexicon-core`; this module
//! re-exports it and supplies the stock implementations.

use lexicon_core::{DictType, LexiconResult};

pub use lexicon_core::DictProvider;

/// Provider over a fixed set of types, typically compiled-in enumerations.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    name: String,
    types: Vec<DictType>,
    system: bool,
}

impl StaticProvider {
    /// Create a provider over the given types.
    pub fn new(name: impl Into<String>, types: Vec<DictType>) -> Self {
        Self {
            name: name.into(),
            types,
            system: false,
        }
    }

    /// Mark this as the distinguished system provider.
    pub fn as_system(mut self) -> Self {
        self.system = true;
        self
    }
}

impl DictProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_sequence(&self) -> LexiconResult<Box<dyn Iterator<Item = DictType> + Send + '_>> {
        Ok(Box::new(self.types.iter().cloned()))
    }

    fn is_system(&self) -> bool {
        self.system
    }
}
