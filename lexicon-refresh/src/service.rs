//! Dictionary service facade.
//!
//! An explicitly constructed value replacing any process-wide registry:
//! each instance owns its store handle, resolution cache, tree resolver,
//! coordinator and dispatcher, so multiple independent instances can
//! coexist (notably in tests).

use crate::coordinator::{RefreshConfig, RefreshCoordinator};
use crate::dispatch::RefreshDispatcher;
use crate::provider::DictProvider;
use lexicon_core::{LexiconConfig, LexiconResult, NullPolicy, RefreshEvent};
use lexicon_storage::{
    DictStore, MemoryStore, ResolutionCache, ResolutionCacheConfig, TreeResolver,
};
use std::sync::Arc;

/// Facade over the resolution and refresh sides of one dictionary instance.
pub struct DictService<S: DictStore + 'static> {
    store: Arc<S>,
    cache: Arc<ResolutionCache<S>>,
    tree: TreeResolver<S>,
    coordinator: Arc<RefreshCoordinator<S>>,
    dispatcher: RefreshDispatcher<S>,
}

impl DictService<MemoryStore> {
    /// Create a service over a fresh in-memory store.
    pub fn in_memory(config: LexiconConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), Vec::new(), config)
    }
}

impl<S: DictStore + 'static> DictService<S> {
    /// Create a service over `store` with the given providers registered.
    pub fn new(
        store: Arc<S>,
        providers: Vec<Arc<dyn DictProvider>>,
        config: LexiconConfig,
    ) -> Self {
        let cache = Arc::new(ResolutionCache::new(
            Arc::clone(&store),
            ResolutionCacheConfig::from(&config),
        ));
        let tree = TreeResolver::new(Arc::clone(&cache)).with_defaults(
            config.default_max_depth,
            config.default_null_policy,
            config.chain_delimiter.clone(),
        );
        let mut coordinator = RefreshCoordinator::new(Arc::clone(&store), RefreshConfig::from(&config));
        for provider in providers {
            coordinator.register_provider(provider);
        }
        let coordinator = Arc::new(coordinator);
        let dispatcher = RefreshDispatcher::new(Arc::clone(&coordinator));

        Self {
            store,
            cache,
            tree,
            coordinator,
            dispatcher,
        }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Get the resolution cache.
    pub fn cache(&self) -> &Arc<ResolutionCache<S>> {
        &self.cache
    }

    /// Run the initial provider sweep, subject to the debounce.
    pub fn bootstrap(&self) -> LexiconResult<bool> {
        self.coordinator.refresh_all(None)
    }

    // === Resolution (synchronous, caller's thread) ===

    /// Resolve the display text for `(type_code, value)`.
    pub fn resolve_text(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>> {
        self.cache.resolve_text(type_code, value)
    }

    /// Resolve the parent value for `(type_code, value)`.
    pub fn resolve_parent(&self, type_code: &str, value: &str) -> LexiconResult<Option<String>> {
        self.cache.resolve_parent(type_code, value)
    }

    /// Resolve a root-first label chain.
    pub fn resolve_chain(
        &self,
        type_code: &str,
        leaf_value: &str,
        max_depth: i32,
        null_policy: NullPolicy,
    ) -> LexiconResult<Vec<String>> {
        self.tree
            .resolve_chain(type_code, leaf_value, max_depth, null_policy)
    }

    /// Resolve a root-first label chain with the configured defaults.
    pub fn resolve_chain_default(
        &self,
        type_code: &str,
        leaf_value: &str,
    ) -> LexiconResult<Vec<String>> {
        self.tree.resolve_chain_default(type_code, leaf_value)
    }

    /// Resolve a joined label chain.
    pub fn resolve_chain_joined(
        &self,
        type_code: &str,
        leaf_value: &str,
        max_depth: i32,
        null_policy: NullPolicy,
        delimiter: &str,
    ) -> LexiconResult<String> {
        self.tree
            .resolve_chain_joined(type_code, leaf_value, max_depth, null_policy, delimiter)
    }

    /// Resolve a joined label chain with the configured defaults.
    pub fn resolve_chain_joined_default(
        &self,
        type_code: &str,
        leaf_value: &str,
    ) -> LexiconResult<String> {
        self.tree.resolve_chain_joined_default(type_code, leaf_value)
    }

    // === Refresh surface ===

    /// Submit a refresh event fire-and-forget.
    pub fn submit(&self, event: RefreshEvent) {
        self.dispatcher.dispatch(event);
    }

    /// Apply a refresh event synchronously on the caller's thread.
    ///
    /// Intended for boot sequences and tests that need completion before
    /// reading.
    pub fn apply(&self, event: RefreshEvent) -> LexiconResult<()> {
        self.coordinator.apply(event)
    }
}

// ============================================================================
// TESTS
// ============================================================================
