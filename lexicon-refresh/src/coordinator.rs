//! Refresh coordinator: debounced full sweeps, partial diff-merges and
//! whole-type replacement.
//!
//! The coordinator is the only writer of dictionary state. Its failure
//! policy is best effort: an error inside one provider sweep or one merge
//! group is logged and the remaining work continues.

use crate::provider::DictProvider;
use lexicon_core::{now_millis, DictType, DictValue, LexiconConfig, LexiconResult, RefreshEvent};
use lexicon_storage::DictStore;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the refresh coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Minimum interval between two full sweeps.
    pub debounce: Duration,
    /// Value batch size for full-sweep flushes.
    pub full_batch_size: usize,
    /// Below this many values a partial refresh stores one at a time.
    pub partial_batch_threshold: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::from(&LexiconConfig::default())
    }
}

impl From<&LexiconConfig> for RefreshConfig {
    fn from(config: &LexiconConfig) -> Self {
        Self {
            debounce: config.refresh_debounce,
            full_batch_size: config.full_batch_size.max(1),
            partial_batch_threshold: config.partial_batch_threshold,
        }
    }
}

impl RefreshConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debounce interval.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the full-sweep batch size.
    pub fn with_full_batch_size(mut self, size: usize) -> Self {
        self.full_batch_size = size.max(1);
        self
    }

    /// Set the partial-refresh batch threshold.
    pub fn with_partial_batch_threshold(mut self, threshold: usize) -> Self {
        self.partial_batch_threshold = threshold;
        self
    }
}

/// Orchestrates full sweeps from providers and partial merges into the
/// store.
///
/// The cache layer is fed implicitly through normal reads; the coordinator
/// never touches it directly.
pub struct RefreshCoordinator<S: DictStore> {
    store: Arc<S>,
    providers: Vec<Arc<dyn DictProvider>>,
    config: RefreshConfig,
    last_refresh_ms: AtomicI64,
}

impl<S: DictStore> RefreshCoordinator<S> {
    /// Create a coordinator with no providers registered.
    pub fn new(store: Arc<S>, config: RefreshConfig) -> Self {
        Self {
            store,
            providers: Vec::new(),
            config: RefreshConfig {
                full_batch_size: config.full_batch_size.max(1),
                ..config
            },
            last_refresh_ms: AtomicI64::new(0),
        }
    }

    /// Register a provider. Sweep order follows registration order.
    pub fn register_provider(&mut self, provider: Arc<dyn DictProvider>) {
        self.providers.push(provider);
    }

    /// Builder-style provider registration.
    pub fn with_provider(mut self, provider: Arc<dyn DictProvider>) -> Self {
        self.register_provider(provider);
        self
    }

    /// Get the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Apply a refresh event synchronously.
    pub fn apply(&self, event: RefreshEvent) -> LexiconResult<()> {
        match event {
            RefreshEvent::RefreshAll { selector } => {
                self.refresh_all(selector.as_deref()).map(|_| ())
            }
            RefreshEvent::RefreshValues {
                values,
                update_type,
                remove_type_if_empty,
            } => self.refresh_values(values, update_type, remove_type_if_empty),
            RefreshEvent::RefreshTypes { types } => self.refresh_types(types),
        }
    }

    /// Run a debounced full sweep over the registered providers.
    ///
    /// Returns `Ok(false)` when the sweep was suppressed by the debounce.
    /// The timestamp check-then-set is intentionally non-exclusive: two
    /// sweeps racing inside a few instructions can both pass, and the store
    /// absorbs the duplicate writes last-write-wins.
    pub fn refresh_all(&self, selector: Option<&str>) -> LexiconResult<bool> {
        let now = now_millis();
        let last = self.last_refresh_ms.load(Ordering::Acquire);
        if now - last < self.config.debounce.as_millis() as i64 {
            tracing::debug!(elapsed_ms = now - last, "full refresh suppressed by debounce");
            return Ok(false);
        }
        self.last_refresh_ms.store(now, Ordering::Release);

        for provider in &self.providers {
            if !provider.supports_refresh(selector) {
                continue;
            }
            if let Err(err) = self.sweep_provider(provider.as_ref()) {
                tracing::warn!(
                    provider = provider.name(),
                    error = %err,
                    "provider sweep failed, continuing with remaining providers"
                );
            }
        }
        Ok(true)
    }

    fn sweep_provider(&self, provider: &dyn DictProvider) -> LexiconResult<()> {
        if provider.stores_full_type() {
            let mut buffer: Vec<DictValue> = Vec::new();
            for dict_type in provider.type_sequence()? {
                self.store.store_type(&dict_type)?;
                if provider.is_system() {
                    self.store.store_system_type(&dict_type)?;
                }
                buffer.extend(dict_type.children.iter().cloned());
                if buffer.len() >= self.config.full_batch_size {
                    tracing::debug!(
                        provider = provider.name(),
                        batch = buffer.len(),
                        "flushing full-refresh value batch"
                    );
                    self.store.store_values(&buffer)?;
                    buffer.clear();
                }
            }
            if !buffer.is_empty() {
                self.store.store_values(&buffer)?;
            }
        } else {
            for value in provider.value_sequence()? {
                self.store.store_values(std::slice::from_ref(&value))?;
            }
        }
        Ok(())
    }

    /// Apply single-value updates.
    ///
    /// Values targeting system types are dropped. With `update_type` the
    /// survivors are grouped by type and diff-merged against the stored
    /// children; without it they go straight to the value sink, one at a
    /// time below `partial_batch_threshold` and as one bulk store at or
    /// above it.
    pub fn refresh_values(
        &self,
        values: Vec<DictValue>,
        update_type: bool,
        remove_type_if_empty: bool,
    ) -> LexiconResult<()> {
        let system = self.store.system_type_keys()?;
        let survivors: Vec<DictValue> = values
            .into_iter()
            .filter(|v| {
                let keep = !system.contains(&v.type_code);
                if !keep {
                    tracing::debug!(type_code = %v.type_code, value = %v.value, "dropping update for system type");
                }
                keep
            })
            .collect();
        if survivors.is_empty() {
            return Ok(());
        }

        if !update_type {
            if survivors.len() < self.config.partial_batch_threshold {
                for value in &survivors {
                    self.store.store_values(std::slice::from_ref(value))?;
                }
            } else {
                self.store.store_values(&survivors)?;
            }
            return Ok(());
        }

        // Group by type code, first-seen order.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<DictValue>> = HashMap::new();
        for value in survivors {
            if !groups.contains_key(&value.type_code) {
                order.push(value.type_code.clone());
            }
            groups.entry(value.type_code.clone()).or_default().push(value);
        }

        for code in order {
            let Some(group) = groups.remove(&code) else {
                continue;
            };
            if let Err(err) = self.merge_group(&code, group, remove_type_if_empty) {
                tracing::warn!(
                    type_code = %code,
                    error = %err,
                    "partial refresh failed for type, continuing with remaining groups"
                );
            }
        }
        Ok(())
    }

    /// Diff-merge one type's incoming entries against its stored children.
    fn merge_group(
        &self,
        code: &str,
        incoming: Vec<DictValue>,
        remove_type_if_empty: bool,
    ) -> LexiconResult<()> {
        let dict_type = match self.store.get_type(code)? {
            None => {
                // Tombstones have nothing to remove from; seed from the
                // labeled subset only.
                let children =
                    dedupe_by_value(incoming.into_iter().filter(|v| !v.is_tombstone()).collect());
                if children.is_empty() {
                    return Ok(());
                }
                DictType::new(code, "").with_children(children)
            }
            Some(mut existing) if existing.children.is_empty() => {
                existing.children =
                    dedupe_by_value(incoming.into_iter().filter(|v| !v.is_tombstone()).collect());
                existing
            }
            Some(mut existing) => {
                let tombstones: HashSet<String> = incoming
                    .iter()
                    .filter(|v| v.is_tombstone())
                    .map(|v| v.value.clone())
                    .collect();
                existing.children.retain(|c| !tombstones.contains(&c.value));
                existing
                    .children
                    .extend(incoming.into_iter().filter(|v| !v.is_tombstone()));
                existing.children = dedupe_by_value(existing.children);
                existing
            }
        };

        if dict_type.children.is_empty() && remove_type_if_empty {
            self.store.remove_type(code)?;
        } else {
            self.store.store_type(&dict_type)?;
        }
        Ok(())
    }

    /// Replace whole types, children included.
    ///
    /// System types are skipped. Each child's back-reference is repaired to
    /// the parent code, then the previous entries are removed and the new
    /// type plus its values stored (remove-then-store, not transactional).
    pub fn refresh_types(&self, types: Vec<DictType>) -> LexiconResult<()> {
        let system = self.store.system_type_keys()?;
        for mut dict_type in types {
            if system.contains(&dict_type.code) {
                tracing::debug!(type_code = %dict_type.code, "skipping replace of system type");
                continue;
            }
            for child in &mut dict_type.children {
                child.type_code = dict_type.code.clone();
            }
            if let Err(err) = self.replace_type(&dict_type) {
                tracing::warn!(
                    type_code = %dict_type.code,
                    error = %err,
                    "type replace failed, continuing with remaining types"
                );
            }
        }
        Ok(())
    }

    fn replace_type(&self, dict_type: &DictType) -> LexiconResult<()> {
        self.store.remove_type(&dict_type.code)?;
        self.store.store_type(dict_type)?;
        self.store.store_values(&dict_type.children)?;
        Ok(())
    }
}

/// Collapse duplicate value keys, last write wins.
///
/// Folds into a map keyed by value while preserving the position of the
/// first occurrence, then re-expands to a list.
fn dedupe_by_value(children: Vec<DictValue>) -> Vec<DictValue> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<DictValue> = Vec::with_capacity(children.len());
    for child in children {
        match index.get(&child.value) {
            Some(&at) => out[at] = child,
            None => {
                index.insert(child.value.clone(), out.len());
                out.push(child);
            }
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_storage::MemoryStore;
    use lexicon_test_utils::{status_type, value, ScriptedProvider};
    use proptest::prelude::*;

    fn coordinator(debounce: Duration) -> RefreshCoordinator<MemoryStore> {
        RefreshCoordinator::new(
            Arc::new(MemoryStore::new()),
            RefreshConfig::default().with_debounce(debounce),
        )
    }

    #[test]
    fn test_debounce_suppresses_second_sweep() {
        let coordinator = coordinator(Duration::from_secs(60));
        assert!(coordinator.refresh_all(None).unwrap());
        assert!(!coordinator.refresh_all(None).unwrap());
    }

    #[test]
    fn test_zero_debounce_never_suppresses() {
        let coordinator = coordinator(Duration::ZERO);
        assert!(coordinator.refresh_all(None).unwrap());
        assert!(coordinator.refresh_all(None).unwrap());
    }

    #[test]
    fn test_full_refresh_stores_types_and_values() {
        let coordinator = coordinator(Duration::ZERO)
            .with_provider(Arc::new(ScriptedProvider::with_types(
                "enums",
                vec![status_type()],
            )));

        coordinator.refresh_all(None).unwrap();
        let stored = coordinator.store().get_type("Status").unwrap().unwrap();
        assert_eq!(stored.children.len(), 2);
        assert_eq!(
            coordinator.store().get_text("Status", "0").unwrap().as_deref(),
            Some("Enabled")
        );
    }

    #[test]
    fn test_system_provider_populates_system_namespace() {
        let coordinator = coordinator(Duration::ZERO).with_provider(Arc::new(
            ScriptedProvider::with_types("enums", vec![status_type()]).as_system(),
        ));

        coordinator.refresh_all(None).unwrap();
        assert!(coordinator
            .store()
            .system_type_keys()
            .unwrap()
            .contains("Status"));
    }

    #[test]
    fn test_value_stream_provider_feeds_value_sink() {
        let coordinator = coordinator(Duration::ZERO).with_provider(Arc::new(
            ScriptedProvider::with_values(
                "stream",
                vec![value("Color", "r", "Red"), value("Color", "g", "Green")],
            ),
        ));

        coordinator.refresh_all(None).unwrap();
        assert_eq!(
            coordinator.store().get_text("Color", "g").unwrap().as_deref(),
            Some("Green")
        );
    }

    #[test]
    fn test_failing_provider_does_not_abort_siblings() {
        let coordinator = coordinator(Duration::ZERO)
            .with_provider(Arc::new(ScriptedProvider::failing("broken")))
            .with_provider(Arc::new(ScriptedProvider::with_types(
                "enums",
                vec![status_type()],
            )));

        coordinator.refresh_all(None).unwrap();
        assert!(coordinator.store().get_type("Status").unwrap().is_some());
    }

    #[test]
    fn test_selector_limits_sweep() {
        let coordinator = coordinator(Duration::ZERO)
            .with_provider(Arc::new(ScriptedProvider::with_types(
                "enums",
                vec![status_type()],
            )))
            .with_provider(Arc::new(ScriptedProvider::with_types(
                "db",
                vec![DictType::new("Color", "Color")
                    .with_children(vec![value("Color", "r", "Red")])],
            )));

        coordinator.refresh_all(Some("db")).unwrap();
        assert!(coordinator.store().get_type("Status").unwrap().is_none());
        assert!(coordinator.store().get_type("Color").unwrap().is_some());
    }

    #[test]
    fn test_merge_tombstone_and_append() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .store()
            .store_type(
                &DictType::new("T", "T")
                    .with_children(vec![value("T", "1", "A"), value("T", "2", "B")]),
            )
            .unwrap();

        coordinator
            .refresh_values(
                vec![DictValue::tombstone("T", "2"), value("T", "3", "C")],
                true,
                false,
            )
            .unwrap();

        let merged = coordinator.store().get_type("T").unwrap().unwrap();
        let entries: Vec<(String, Option<String>)> = merged
            .children
            .iter()
            .map(|c| (c.value.clone(), c.label.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("1".to_string(), Some("A".to_string())),
                ("3".to_string(), Some("C".to_string())),
            ]
        );
    }

    #[test]
    fn test_merge_updates_label_in_place() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .store()
            .store_type(&DictType::new("Status", "Status").with_children(vec![
                value("Status", "0", "Enabled"),
                value("Status", "1", "Disabled"),
            ]))
            .unwrap();

        coordinator
            .refresh_values(vec![value("Status", "1", "Off")], true, false)
            .unwrap();

        let merged = coordinator.store().get_type("Status").unwrap().unwrap();
        assert_eq!(merged.children.len(), 2);
        assert_eq!(merged.child("1").unwrap().label.as_deref(), Some("Off"));
        // Position of the first occurrence is preserved.
        assert_eq!(merged.children[1].value, "1");
    }

    #[test]
    fn test_merge_seeds_absent_type_without_tombstones() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .refresh_values(
                vec![DictValue::tombstone("New", "x"), value("New", "1", "One")],
                true,
                false,
            )
            .unwrap();

        let seeded = coordinator.store().get_type("New").unwrap().unwrap();
        assert_eq!(seeded.children.len(), 1);
        assert_eq!(seeded.children[0].value, "1");
    }

    #[test]
    fn test_merge_seeds_absent_type_with_unique_values() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .refresh_values(
                vec![value("New", "1", "first"), value("New", "1", "second")],
                true,
                false,
            )
            .unwrap();

        let seeded = coordinator.store().get_type("New").unwrap().unwrap();
        assert_eq!(seeded.children.len(), 1);
        // Last write wins within the batch.
        assert_eq!(seeded.children[0].label.as_deref(), Some("second"));
    }

    #[test]
    fn test_merge_all_tombstones_into_absent_type_stores_nothing() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .refresh_values(vec![DictValue::tombstone("New", "x")], true, false)
            .unwrap();
        assert!(coordinator.store().get_type("New").unwrap().is_none());
    }

    #[test]
    fn test_merge_replaces_empty_children_wholesale() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .store()
            .store_type(&DictType::new("T", "T"))
            .unwrap();

        coordinator
            .refresh_values(
                vec![DictValue::tombstone("T", "9"), value("T", "1", "One")],
                true,
                false,
            )
            .unwrap();

        let merged = coordinator.store().get_type("T").unwrap().unwrap();
        assert_eq!(merged.children.len(), 1);
        assert_eq!(merged.children[0].value, "1");
    }

    #[test]
    fn test_merge_into_empty_children_keeps_values_unique() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .store()
            .store_type(&DictType::new("T", "T"))
            .unwrap();

        coordinator
            .refresh_values(
                vec![value("T", "1", "first"), value("T", "1", "second")],
                true,
                false,
            )
            .unwrap();

        let merged = coordinator.store().get_type("T").unwrap().unwrap();
        assert_eq!(merged.children.len(), 1);
        assert_eq!(merged.children[0].label.as_deref(), Some("second"));
    }

    #[test]
    fn test_remove_type_if_empty() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .store()
            .store_type(&DictType::new("T", "T").with_children(vec![value("T", "1", "A")]))
            .unwrap();

        // Without the flag the emptied type is kept.
        coordinator
            .refresh_values(vec![DictValue::tombstone("T", "1")], true, false)
            .unwrap();
        assert!(coordinator.store().get_type("T").unwrap().is_some());

        coordinator
            .store()
            .store_type(&DictType::new("T", "T").with_children(vec![value("T", "1", "A")]))
            .unwrap();
        coordinator
            .refresh_values(vec![DictValue::tombstone("T", "1")], true, true)
            .unwrap();
        assert!(coordinator.store().get_type("T").unwrap().is_none());
    }

    #[test]
    fn test_refresh_values_skips_system_types() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator.store().store_type(&status_type()).unwrap();
        coordinator
            .store()
            .store_system_type(&status_type())
            .unwrap();

        coordinator
            .refresh_values(vec![value("Status", "1", "Off")], true, false)
            .unwrap();

        // Stored children are textually unchanged.
        let stored = coordinator.store().get_type("Status").unwrap().unwrap();
        assert_eq!(stored.child("1").unwrap().label.as_deref(), Some("Disabled"));
    }

    #[test]
    fn test_refresh_values_direct_path_small_and_bulk() {
        let coordinator = RefreshCoordinator::new(
            Arc::new(MemoryStore::new()),
            RefreshConfig::default()
                .with_debounce(Duration::ZERO)
                .with_partial_batch_threshold(2),
        );

        // Below the threshold: one-at-a-time path.
        coordinator
            .refresh_values(vec![value("Color", "r", "Red")], false, false)
            .unwrap();
        // At the threshold: bulk path.
        coordinator
            .refresh_values(
                vec![value("Color", "g", "Green"), value("Color", "b", "Blue")],
                false,
                false,
            )
            .unwrap();

        let stored = coordinator.store().get_type("Color").unwrap().unwrap();
        assert_eq!(stored.children.len(), 3);
    }

    #[test]
    fn test_refresh_types_repairs_back_references() {
        let coordinator = coordinator(Duration::ZERO);
        let mut child = value("Wrong", "1", "One");
        child.parent_value = None;
        coordinator
            .refresh_types(vec![DictType::new("Right", "Right").with_children(vec![child])])
            .unwrap();

        let stored = coordinator.store().get_type("Right").unwrap().unwrap();
        assert_eq!(stored.children[0].type_code, "Right");
    }

    #[test]
    fn test_refresh_types_replaces_previous_children() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .store()
            .store_type(
                &DictType::new("T", "T")
                    .with_children(vec![value("T", "1", "Old"), value("T", "2", "Gone")]),
            )
            .unwrap();

        coordinator
            .refresh_types(vec![
                DictType::new("T", "T").with_children(vec![value("T", "1", "New")])
            ])
            .unwrap();

        let stored = coordinator.store().get_type("T").unwrap().unwrap();
        assert_eq!(stored.children.len(), 1);
        assert_eq!(stored.child("1").unwrap().label.as_deref(), Some("New"));
        assert!(stored.child("2").is_none());
    }

    #[test]
    fn test_refresh_types_skips_system_types() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator.store().store_type(&status_type()).unwrap();
        coordinator
            .store()
            .store_system_type(&status_type())
            .unwrap();

        coordinator
            .refresh_types(vec![DictType::new("Status", "Status")])
            .unwrap();

        let stored = coordinator.store().get_type("Status").unwrap().unwrap();
        assert_eq!(stored.children.len(), 2);
    }

    #[test]
    fn test_apply_routes_events() {
        let coordinator = coordinator(Duration::ZERO);
        coordinator
            .apply(RefreshEvent::refresh_values(
                vec![value("Color", "r", "Red")],
                true,
            ))
            .unwrap();
        assert!(coordinator.store().get_type("Color").unwrap().is_some());

        coordinator
            .apply(RefreshEvent::refresh_types(vec![DictType::new("C2", "C2")]))
            .unwrap();
        assert!(coordinator.store().get_type("C2").unwrap().is_some());
    }

    #[test]
    fn test_batch_flush_on_large_provider() {
        let children: Vec<DictValue> = (0..25)
            .map(|i| value("Big", i.to_string(), format!("L{i}")))
            .collect();
        let coordinator = RefreshCoordinator::new(
            Arc::new(MemoryStore::new()),
            RefreshConfig::default()
                .with_debounce(Duration::ZERO)
                .with_full_batch_size(10),
        )
        .with_provider(Arc::new(ScriptedProvider::with_types(
            "big",
            vec![DictType::new("Big", "Big").with_children(children)],
        )));

        coordinator.refresh_all(None).unwrap();
        let stored = coordinator.store().get_type("Big").unwrap().unwrap();
        assert_eq!(stored.children.len(), 25);
    }

    fn arb_incoming() -> impl Strategy<Value = Vec<DictValue>> {
        prop::collection::vec(
            ("[0-5]", prop::option::of("[a-z]{1,4}")).prop_map(|(v, label)| match label {
                Some(l) => value("P", v, l),
                None => DictValue::tombstone("P", v),
            }),
            0..12,
        )
    }

    proptest! {
        #[test]
        fn prop_merge_never_duplicates_or_persists_tombstones(
            existing_keys in prop::collection::hash_set("[0-5]", 0..6),
            incoming in arb_incoming(),
        ) {
            let coordinator = coordinator(Duration::ZERO);
            let children: Vec<DictValue> = existing_keys
                .iter()
                .map(|k| value("P", k.clone(), format!("old-{k}")))
                .collect();
            if !children.is_empty() {
                coordinator
                    .store()
                    .store_type(&DictType::new("P", "P").with_children(children))
                    .unwrap();
            }

            coordinator.refresh_values(incoming, true, false).unwrap();

            if let Some(merged) = coordinator.store().get_type("P").unwrap() {
                let mut seen = HashSet::new();
                for child in &merged.children {
                    prop_assert!(seen.insert(child.value.clone()), "duplicate value key");
                    prop_assert!(!child.is_tombstone(), "tombstone persisted");
                }
            }
        }
    }
}
