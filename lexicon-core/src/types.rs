//! Dictionary entity structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dict type - a named category of codes (e.g. "Status").
///
/// Children are kept in insertion order. Within one type the `value` field
/// of each child is unique (map semantics); the merge algorithm enforces
/// this with last-write-wins deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictType {
    /// Unique type code.
    pub code: String,
    /// Human-readable title.
    pub title: String,
    /// Free-text comment.
    pub comment: String,
    /// Ordered child entries.
    pub children: Vec<DictValue>,
    /// True for types sourced from compiled definitions. System types are
    /// immune to event-driven mutation through the refresh surface.
    pub system: bool,
}

impl DictType {
    /// Create a new dict type with no children.
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            comment: String::new(),
            children: Vec::new(),
            system: false,
        }
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Replace the children wholesale.
    pub fn with_children(mut self, children: Vec<DictValue>) -> Self {
        self.children = children;
        self
    }

    /// Mark this type as a system type.
    pub fn as_system(mut self) -> Self {
        self.system = true;
        self
    }

    /// Look up a child entry by its value key.
    pub fn child(&self, value: &str) -> Option<&DictValue> {
        self.children.iter().find(|c| c.value == value)
    }
}

/// Dict value - one code→label entry within a dict type.
///
/// A value whose `label` is `None` is a tombstone: it may appear transiently
/// in update batches to request removal of the matching entry, but is never
/// persisted as a resolvable entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictValue {
    /// Back-reference to the owning dict type.
    pub type_code: String,
    /// Opaque comparable key, unique within the owning type.
    pub value: String,
    /// Display label. `None` marks a tombstone.
    pub label: Option<String>,
    /// Optional parent value for tree structures.
    pub parent_value: Option<String>,
    /// Sort order hint.
    pub sort_order: i32,
    /// Whether this entry is disabled for selection surfaces.
    pub disabled: bool,
    /// Open extension map for arbitrary metadata.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DictValue {
    /// Create a new resolvable entry.
    pub fn new(
        type_code: impl Into<String>,
        value: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            type_code: type_code.into(),
            value: value.into(),
            label: Some(label.into()),
            parent_value: None,
            sort_order: 0,
            disabled: false,
            extra: BTreeMap::new(),
        }
    }

    /// Create a tombstone entry requesting removal of `value` during merge.
    pub fn tombstone(type_code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_code: type_code.into(),
            value: value.into(),
            label: None,
            parent_value: None,
            sort_order: 0,
            disabled: false,
            extra: BTreeMap::new(),
        }
    }

    /// Set the parent value.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_value = Some(parent.into());
        self
    }

    /// Set the sort order.
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Mark the entry as disabled.
    pub fn as_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Attach an extension entry.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// True if this entry is a removal marker (label is absent).
    pub fn is_tombstone(&self) -> bool {
        self.label.is_none()
    }
}

/// Policy for rendering an absent label during tree resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NullPolicy {
    /// Skip the node entirely.
    #[default]
    Drop,
    /// Emit an empty string for the node.
    EmitEmpty,
    /// Emit a literal placeholder for the node.
    EmitPlaceholder,
}

// =============================================================================
// TESTS
// =============================================================================
