//! Declarative field→dictionary-type mapping.
//!
//! Replaces reflection-driven field discovery with an explicit mapping the
//! caller supplies: each mapped field names the dict type its raw code
//! belongs to, and whether it resolves as a flat label or a joined parent
//! chain. The transform produces a plain map of display text, so no dynamic
//! type generation is involved.

use crate::service::DictService;
use lexicon_core::LexiconResult;
use lexicon_storage::DictStore;
use std::collections::BTreeMap;

/// One field mapped to a dictionary type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Field name in the caller's object.
    pub field: String,
    /// Dict type the field's raw code belongs to.
    pub type_code: String,
    /// Resolve as a joined parent chain instead of a flat label.
    pub tree: bool,
    /// Delimiter override for tree fields. Falls back to the service
    /// default when absent.
    pub delimiter: Option<String>,
}

impl FieldMapping {
    /// Map `field` to `type_code` as a flat label.
    pub fn new(field: impl Into<String>, type_code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            type_code: type_code.into(),
            tree: false,
            delimiter: None,
        }
    }

    /// Resolve this field as a joined parent chain.
    pub fn as_tree(mut self) -> Self {
        self.tree = true;
        self
    }

    /// Override the chain delimiter for this field.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }
}

/// Resolved display text per field. `None` marks a field whose raw value
/// was missing from the input.
pub type TransformOutput = BTreeMap<String, Option<String>>;

impl<S: DictStore + 'static> DictService<S> {
    /// Resolve a map of raw field values into display text.
    ///
    /// A flat field whose code is unknown resolves to `None`; a tree field
    /// renders absent labels per the service's null policy. Unresolvable
    /// codes never raise an error to the presentation layer.
    pub fn transform(
        &self,
        mappings: &[FieldMapping],
        values: &BTreeMap<String, String>,
    ) -> LexiconResult<TransformOutput> {
        let mut output = TransformOutput::new();
        for mapping in mappings {
            let resolved = match values.get(&mapping.field) {
                None => None,
                Some(raw) if mapping.tree => {
                    let joined = match &mapping.delimiter {
                        Some(delimiter) => self
                            .resolve_chain_default(&mapping.type_code, raw)?
                            .join(delimiter),
                        None => self.resolve_chain_joined_default(&mapping.type_code, raw)?,
                    };
                    Some(joined)
                }
                Some(raw) => self.resolve_text(&mapping.type_code, raw)?,
            };
            output.insert(mapping.field.clone(), resolved);
        }
        Ok(output)
    }
}

// ============================================================================
// TESTS
// ============================================================================
