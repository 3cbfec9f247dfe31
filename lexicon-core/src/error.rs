//! Error types for LEXICON operations
//!
//! A lookup miss is never an error: all resolution operations return
//! `Option` for absent entries. The variants here cover the store boundary
//! failing, a provider failing mid-iteration and invalid configuration.

use thiserror::Error;

/// Store boundary errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Write failed for dict type {code}: {reason}")]
    WriteFailed { code: String, reason: String },
}

/// Provider iteration errors, isolated per provider during a full refresh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider {provider} iteration failed: {reason}")]
    IterationFailed { provider: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all LEXICON errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexiconError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for LEXICON operations.
pub type LexiconResult<T> = Result<T, LexiconError>;

// =============================================================================
// TESTS
// =============================================================================
