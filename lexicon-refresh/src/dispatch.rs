//! Fire-and-forget refresh dispatch.

use crate::coordinator::RefreshCoordinator;
use lexicon_core::RefreshEvent;
use lexicon_storage::DictStore;
use std::sync::Arc;

/// Dispatches refresh events on detached worker threads.
///
/// No completion signal flows back to the caller; failures are observable
/// only through logs and store state. This matches the scheduling model of
/// the resolution path, which stays synchronous on the caller's thread.
pub struct RefreshDispatcher<S: DictStore + 'static> {
    coordinator: Arc<RefreshCoordinator<S>>,
}

impl<S: DictStore + 'static> RefreshDispatcher<S> {
    /// Create a dispatcher over a shared coordinator.
    pub fn new(coordinator: Arc<RefreshCoordinator<S>>) -> Self {
        Self { coordinator }
    }

    /// Get the shared coordinator.
    pub fn coordinator(&self) -> &Arc<RefreshCoordinator<S>> {
        &self.coordinator
    }

    /// Dispatch an event and return immediately.
    pub fn dispatch(&self, event: RefreshEvent) {
        let coordinator = Arc::clone(&self.coordinator);
        let spawned = std::thread::Builder::new()
            .name("lexicon-refresh".to_string())
            .spawn(move || {
                if let Err(err) = coordinator.apply(event) {
                    tracing::warn!(error = %err, "dispatched refresh event failed");
                }
            });
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "failed to spawn refresh worker thread");
        }
    }
}

impl<S: DictStore + 'static> Clone for RefreshDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}
