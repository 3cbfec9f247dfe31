//! Refresh event surface
//!
//! Events are the trigger points exposed to external callers. They are
//! dispatched fire-and-forget: no completion signal flows back to the
//! caller, and failures are observable only through logs and store state.

use crate::types::{DictType, DictValue};
use serde::{Deserialize, Serialize};

/// A refresh trigger event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RefreshEvent {
    /// Run a full sweep over the registered providers.
    RefreshAll {
        /// Optional provider selector; providers decide via `supports_refresh`.
        selector: Option<String>,
    },
    /// Apply a batch of single-value updates.
    RefreshValues {
        values: Vec<DictValue>,
        /// When true, run the diff-merge against the owning type instead of
        /// storing the values directly.
        update_type: bool,
        /// When true, a type whose merged children become empty is removed.
        remove_type_if_empty: bool,
    },
    /// Replace whole types, children included.
    RefreshTypes { types: Vec<DictType> },
}

impl RefreshEvent {
    /// Full sweep over all providers.
    pub fn refresh_all() -> Self {
        Self::RefreshAll { selector: None }
    }

    /// Full sweep restricted by a provider selector.
    pub fn refresh_all_selected(selector: impl Into<String>) -> Self {
        Self::RefreshAll {
            selector: Some(selector.into()),
        }
    }

    /// Value update batch with merge semantics.
    pub fn refresh_values(values: Vec<DictValue>, update_type: bool) -> Self {
        Self::RefreshValues {
            values,
            update_type,
            remove_type_if_empty: false,
        }
    }

    /// Full type replacement.
    pub fn refresh_types(types: Vec<DictType>) -> Self {
        Self::RefreshTypes { types }
    }
}
