//! LEXICON Core - Dictionary Data Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains the dictionary data model, the error taxonomy, the
//! master configuration struct, the refresh event surface and the provider
//! contract.

pub mod config;
pub mod error;
pub mod event;
pub mod provider;
pub mod types;

pub use config::LexiconConfig;
pub use error::{ConfigError, LexiconError, LexiconResult, ProviderError, StoreError};
pub use event::RefreshEvent;
pub use provider::DictProvider;
pub use types::{DictType, DictValue, NullPolicy};

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Current time in milliseconds since the Unix epoch.
///
/// Used by the refresh debounce, which stores its last-run instant as a
/// plain integer so it can live in an atomic.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
