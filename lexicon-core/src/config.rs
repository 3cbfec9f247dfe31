//! Configuration types

use crate::error::{ConfigError, LexiconResult};
use crate::types::NullPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Master configuration struct for a dictionary service instance.
///
/// Every knob has a safe default; a missing or unparsable environment value
/// falls back to the default rather than failing (missing configuration is
/// treated as feature-disabled, never fatal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Minimum interval between two full refresh sweeps.
    pub refresh_debounce: Duration,
    /// Number of values accumulated before a batch flush during a full refresh.
    pub full_batch_size: usize,
    /// Below this many values a partial refresh stores entries one at a time;
    /// at or above it a single bulk store is used.
    pub partial_batch_threshold: usize,

    /// Capacity of the positive (hit) caches, per namespace.
    pub positive_capacity: usize,
    /// TTL of positive cache entries. Zero disables expiry.
    pub positive_ttl: Duration,
    /// Capacity of the negative (miss counter) caches, per namespace.
    pub negative_capacity: usize,
    /// TTL of negative cache entries. Zero disables expiry.
    pub negative_ttl: Duration,
    /// Miss count at which lookups short-circuit without a store round-trip.
    /// At most this many lookups per key reach the store per negative TTL
    /// window.
    pub miss_threshold: u32,

    /// Default maximum depth for tree resolution. `<= 0` means unlimited.
    pub default_max_depth: i32,
    /// Default rendering policy for absent labels.
    pub default_null_policy: NullPolicy,
    /// Default delimiter for joined chain output.
    pub chain_delimiter: String,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            refresh_debounce: Duration::from_secs(30),
            full_batch_size: 1000,
            partial_batch_threshold: 20,
            positive_capacity: 10_000,
            positive_ttl: Duration::from_secs(3600),
            negative_capacity: 10_000,
            negative_ttl: Duration::from_secs(300),
            miss_threshold: 50,
            default_max_depth: -1,
            default_null_policy: NullPolicy::Drop,
            chain_delimiter: "/".to_string(),
        }
    }
}

impl LexiconConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `LEXICON_REFRESH_DEBOUNCE_SECS`: Full refresh debounce interval (default: 30)
    /// - `LEXICON_FULL_BATCH_SIZE`: Full refresh batch size (default: 1000)
    /// - `LEXICON_PARTIAL_BATCH_THRESHOLD`: Partial refresh batch threshold (default: 20)
    /// - `LEXICON_POSITIVE_CAPACITY` / `LEXICON_POSITIVE_TTL_SECS`: Positive cache bounds
    /// - `LEXICON_NEGATIVE_CAPACITY` / `LEXICON_NEGATIVE_TTL_SECS`: Negative cache bounds
    /// - `LEXICON_MISS_THRESHOLD`: Miss count short-circuit threshold (default: 50)
    /// - `LEXICON_DEFAULT_MAX_DEPTH`: Default tree depth, <= 0 unlimited (default: -1)
    /// - `LEXICON_NULL_POLICY`: `drop` | `empty` | `placeholder` (default: drop)
    /// - `LEXICON_CHAIN_DELIMITER`: Joined chain delimiter (default: "/")
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            refresh_debounce: env_secs("LEXICON_REFRESH_DEBOUNCE_SECS", defaults.refresh_debounce),
            full_batch_size: env_parse("LEXICON_FULL_BATCH_SIZE", defaults.full_batch_size),
            partial_batch_threshold: env_parse(
                "LEXICON_PARTIAL_BATCH_THRESHOLD",
                defaults.partial_batch_threshold,
            ),
            positive_capacity: env_parse("LEXICON_POSITIVE_CAPACITY", defaults.positive_capacity),
            positive_ttl: env_secs("LEXICON_POSITIVE_TTL_SECS", defaults.positive_ttl),
            negative_capacity: env_parse("LEXICON_NEGATIVE_CAPACITY", defaults.negative_capacity),
            negative_ttl: env_secs("LEXICON_NEGATIVE_TTL_SECS", defaults.negative_ttl),
            miss_threshold: env_parse("LEXICON_MISS_THRESHOLD", defaults.miss_threshold),
            default_max_depth: env_parse("LEXICON_DEFAULT_MAX_DEPTH", defaults.default_max_depth),
            default_null_policy: std::env::var("LEXICON_NULL_POLICY")
                .ok()
                .and_then(|s| parse_null_policy(&s))
                .unwrap_or(defaults.default_null_policy),
            chain_delimiter: std::env::var("LEXICON_CHAIN_DELIMITER")
                .unwrap_or(defaults.chain_delimiter),
        }
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - full_batch_size > 0
    /// - positive_capacity / negative_capacity > 0
    /// - miss_threshold > 0
    /// - chain_delimiter is non-empty
    pub fn validate(&self) -> LexiconResult<()> {
        if self.full_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "full_batch_size".to_string(),
                value: "0".to_string(),
                reason: "full_batch_size must be greater than 0".to_string(),
            }
            .into());
        }

        if self.positive_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "positive_capacity".to_string(),
                value: "0".to_string(),
                reason: "positive_capacity must be greater than 0".to_string(),
            }
            .into());
        }

        if self.negative_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "negative_capacity".to_string(),
                value: "0".to_string(),
                reason: "negative_capacity must be greater than 0".to_string(),
            }
            .into());
        }

        if self.miss_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "miss_threshold".to_string(),
                value: "0".to_string(),
                reason: "a zero threshold would short-circuit every lookup".to_string(),
            }
            .into());
        }

        if self.chain_delimiter.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "chain_delimiter".to_string(),
                value: String::new(),
                reason: "chain_delimiter must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_secs(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn parse_null_policy(s: &str) -> Option<NullPolicy> {
    match s.to_ascii_lowercase().as_str() {
        "drop" => Some(NullPolicy::Drop),
        "empty" => Some(NullPolicy::EmitEmpty),
        "placeholder" => Some(NullPolicy::EmitPlaceholder),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = LexiconConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.refresh_debounce, Duration::from_secs(30));
        assert_eq!(config.full_batch_size, 1000);
        assert_eq!(config.miss_threshold, 50);
        assert_eq!(config.default_max_depth, -1);
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let config = LexiconConfig {
            full_batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = LexiconConfig {
            positive_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LexiconConfig {
            negative_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_miss_threshold() {
        let config = LexiconConfig {
            miss_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_delimiter() {
        let config = LexiconConfig {
            chain_delimiter: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_null_policy() {
        assert_eq!(parse_null_policy("drop"), Some(NullPolicy::Drop));
        assert_eq!(parse_null_policy("EMPTY"), Some(NullPolicy::EmitEmpty));
        assert_eq!(
            parse_null_policy("placeholder"),
            Some(NullPolicy::EmitPlaceholder)
        );
        assert_eq!(parse_null_policy("bogus"), None);
    }

    #[test]
    fn test_from_env_falls_back_to_defaults() {
        // No LEXICON_* variables are set in the test environment, so the
        // result must equal the defaults.
        let config = LexiconConfig::from_env();
        assert_eq!(config, LexiconConfig::default());
    }
}
