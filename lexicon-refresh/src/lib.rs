//! LEXICON Refresh - Providers, Coordinator and Service Facade
//!
//! This crate owns the write side of the dictionary system: the provider
//! contract for boot-time and event-driven entry sources, the refresh
//! coordinator that sweeps providers and merges partial updates into the
//! store, the fire-and-forget dispatcher, and the `DictService` facade that
//! wires store, cache, tree resolver and coordinator into one explicitly
//! constructed value.

pub mod coordinator;
pub mod dispatch;
pub mod mapping;
pub mod provider;
pub mod service;

pub use coordinator::{RefreshConfig, RefreshCoordinator};
pub use dispatch::RefreshDispatcher;
pub use mapping::{FieldMapping, TransformOutput};
pub use provider::{DictProvider, StaticProvider};
pub use service::DictService;

// Re-export the event surface for convenience
pub use lexicon_core::RefreshEvent;
