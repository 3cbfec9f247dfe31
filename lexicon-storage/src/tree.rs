//! Parent-chain tree resolution.

use crate::cache::ResolutionCache;
use crate::DictStore;
use lexicon_core::{LexiconResult, NullPolicy};
use std::sync::Arc;

/// Text emitted for an absent label under `NullPolicy::EmitPlaceholder`.
pub const NULL_PLACEHOLDER: &str = "null";

/// Walks parent chains through the resolution cache.
///
/// The depth bound limits how many nodes are visited; it does not detect
/// cycles in a malformed parent graph, so an unlimited walk over a cyclic
/// chain will not terminate.
pub struct TreeResolver<S: DictStore> {
    cache: Arc<ResolutionCache<S>>,
    default_max_depth: i32,
    default_null_policy: NullPolicy,
    default_delimiter: String,
}

impl<S: DictStore> TreeResolver<S> {
    /// Create a resolver with library defaults (unlimited depth, drop
    /// absent labels, "/" delimiter).
    pub fn new(cache: Arc<ResolutionCache<S>>) -> Self {
        Self {
            cache,
            default_max_depth: -1,
            default_null_policy: NullPolicy::Drop,
            default_delimiter: "/".to_string(),
        }
    }

    /// Override the defaults used by the `_default` variants.
    pub fn with_defaults(
        mut self,
        max_depth: i32,
        null_policy: NullPolicy,
        delimiter: impl Into<String>,
    ) -> Self {
        self.default_max_depth = max_depth;
        self.default_null_policy = null_policy;
        self.default_delimiter = delimiter.into();
        self
    }

    /// Resolve the label chain from `leaf_value` up to the root.
    ///
    /// Output is root-first. `max_depth <= 0` means unlimited; otherwise at
    /// most `max_depth` nodes are visited, counting from the leaf.
    pub fn resolve_chain(
        &self,
        type_code: &str,
        leaf_value: &str,
        max_depth: i32,
        null_policy: NullPolicy,
    ) -> LexiconResult<Vec<String>> {
        let mut labels = Vec::new();
        let mut current = leaf_value.to_string();
        let mut visited = 0i32;

        loop {
            visited += 1;
            match self.cache.resolve_text(type_code, &current)? {
                Some(text) => labels.push(text),
                None => match null_policy {
                    NullPolicy::Drop => {}
                    NullPolicy::EmitEmpty => labels.push(String::new()),
                    NullPolicy::EmitPlaceholder => labels.push(NULL_PLACEHOLDER.to_string()),
                },
            }

            if max_depth > 0 && visited >= max_depth {
                break;
            }
            match self.cache.resolve_parent(type_code, &current)? {
                Some(parent) => current = parent,
                None => break,
            }
        }

        labels.reverse();
        Ok(labels)
    }

    /// Resolve a chain using the configured defaults.
    pub fn resolve_chain_default(
        &self,
        type_code: &str,
        leaf_value: &str,
    ) -> LexiconResult<Vec<String>> {
        self.resolve_chain(
            type_code,
            leaf_value,
            self.default_max_depth,
            self.default_null_policy,
        )
    }

    /// Resolve a chain and join it root-first with `delimiter`.
    pub fn resolve_chain_joined(
        &self,
        type_code: &str,
        leaf_value: &str,
        max_depth: i32,
        null_policy: NullPolicy,
        delimiter: &str,
    ) -> LexiconResult<String> {
        Ok(self
            .resolve_chain(type_code, leaf_value, max_depth, null_policy)?
            .join(delimiter))
    }

    /// Resolve a joined chain using the configured defaults.
    pub fn resolve_chain_joined_default(
        &self,
        type_code: &str,
        leaf_value: &str,
    ) -> LexiconResult<String> {
        self.resolve_chain_joined(
            type_code,
            leaf_value,
            self.default_max_depth,
            self.default_null_policy,
            &self.default_delimiter,
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
