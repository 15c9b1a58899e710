//! Cache configuration
//!
//! Loaded from environment variables with defaults suitable for a single
//! deployment. The store handle is not configuration: it is handed to the
//! caching layer directly, and leaving it out disables caching.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigError;

/// Fixed prefix of every fingerprint.
pub const DEFAULT_KEY_PREFIX: &str = "i18n";

/// Store key holding the invalidation epoch.
pub const DEFAULT_VERSION_KEY: &str = "i18n/cache_version";

/// How long a process trusts its local copy of the epoch.
pub const DEFAULT_VERSION_TTL: Duration = Duration::from_secs(5);

/// Configuration for the translation cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Partitions fingerprints when several logical caches share one store.
    pub namespace: Option<String>,
    /// Staleness bound of the in-memory epoch.
    pub version_ttl: Duration,
    /// First fingerprint segment.
    pub key_prefix: String,
    /// Store key of the epoch counter.
    pub version_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            version_ttl: DEFAULT_VERSION_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            version_key: DEFAULT_VERSION_KEY.to_string(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the epoch staleness bound.
    pub fn with_version_ttl(mut self, ttl: Duration) -> Self {
        self.version_ttl = ttl;
        self
    }

    /// Set the fingerprint prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the epoch store key.
    pub fn with_version_key(mut self, key: impl Into<String>) -> Self {
        self.version_key = key.into();
        self
    }

    /// Create CacheConfig from environment variables.
    ///
    /// Environment variables:
    /// - `LEXICACHE_NAMESPACE`: fingerprint namespace (empty = none)
    /// - `LEXICACHE_VERSION_TTL_MS`: epoch staleness bound in ms (default: 5000)
    /// - `LEXICACHE_KEY_PREFIX`: fingerprint prefix (default: "i18n")
    /// - `LEXICACHE_VERSION_KEY`: epoch store key (default: "i18n/cache_version")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let namespace = lookup("LEXICACHE_NAMESPACE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let version_ttl = match lookup("LEXICACHE_VERSION_TTL_MS") {
            Some(raw) => {
                let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: "LEXICACHE_VERSION_TTL_MS".to_string(),
                    value: raw.clone(),
                    reason: "expected a whole number of milliseconds".to_string(),
                })?;
                Duration::from_millis(millis)
            }
            None => defaults.version_ttl,
        };

        let key_prefix = lookup("LEXICACHE_KEY_PREFIX").unwrap_or(defaults.key_prefix);
        let version_key = lookup("LEXICACHE_VERSION_KEY").unwrap_or(defaults.version_key);

        let config = Self {
            namespace,
            version_ttl,
            key_prefix,
            version_key,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce unusable fingerprints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "key_prefix".to_string(),
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.version_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "version_key".to_string(),
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
