//! Error types for lexicache operations

use crate::{LookupKey, Locale};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backing store errors.
///
/// Every variant means the store could not serve the request. None of them
/// are retried by the cache layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Serialization failed for cache entry: {reason}")]
    Serialization { reason: String },

    #[error("Store transaction failed: {reason}")]
    Transaction { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// The wrapped lookup has no translation for the requested key.
///
/// This is the one failure that is persisted as a cached outcome, so it is
/// serializable and compares by value.
#[derive(Debug, Clone, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[error("Translation missing: {locale}.{key}")]
pub struct MissingTranslation {
    pub locale: Locale,
    pub key: LookupKey,
}

impl MissingTranslation {
    pub fn new(locale: Locale, key: LookupKey) -> Self {
        Self { locale, key }
    }
}

/// Any other failure raised by the wrapped lookup. Never cached.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Lookup failed: {reason}")]
pub struct LookupError {
    pub reason: String,
}

impl LookupError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
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

/// Master error type for translation lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslateError {
    #[error(transparent)]
    Missing(#[from] MissingTranslation),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl TranslateError {
    /// Returns true if this is the "no translation exists" condition.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}

/// Result type alias for translation lookups.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// TESTS
// =============================================================================
