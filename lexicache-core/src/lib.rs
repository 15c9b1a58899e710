//! Lexicache Core - Lookup Types and Contracts
//!
//! Data types shared by every lexicache crate: the inputs of a translation
//! lookup, the lookup trait itself, configuration, and the error taxonomy.
//! This crate performs no store I/O.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod options;

pub use config::{
    CacheConfig, DEFAULT_KEY_PREFIX, DEFAULT_VERSION_KEY, DEFAULT_VERSION_TTL,
};
pub use error::{
    ConfigError, LookupError, MissingTranslation, StoreError, StoreResult, TranslateError,
    TranslateResult,
};
pub use options::{Callback, OptionValue, TranslateOptions};

/// A looked-up translation. Plain strings, pluralization tables, and whole
/// subtrees are all JSON values.
pub type TranslationValue = serde_json::Value;

/// Number of SHA-256 bytes kept in a fingerprint component.
pub const DIGEST_BYTES: usize = 16;

/// Compute the hex digest used for fingerprint components.
///
/// SHA-256 truncated to [`DIGEST_BYTES`], lowercase hex.
pub fn compute_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    hex::encode(&result[..DIGEST_BYTES])
}

// ============================================================================
// LOOKUP INPUTS
// ============================================================================

/// A locale identifier such as `en` or `pt-BR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locale {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// The key being looked up: one dotted path, or several resolved together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKey {
    Path(String),
    Batch(Vec<String>),
}

impl LookupKey {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub fn batch<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Batch(paths.into_iter().map(Into::into).collect())
    }

    /// Injective byte encoding of the key (length-prefixed segments).
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Self::Path(path) => {
                out.extend_from_slice(b"p");
                push_segment(&mut out, path);
            }
            Self::Batch(paths) => {
                out.extend_from_slice(b"b");
                out.extend_from_slice(paths.len().to_string().as_bytes());
                for path in paths {
                    push_segment(&mut out, path);
                }
            }
        }
        out
    }

    /// Digest of [`Self::canonical_bytes`].
    pub fn digest(&self) -> String {
        compute_digest(&self.canonical_bytes())
    }
}

fn push_segment(out: &mut Vec<u8>, segment: &str) {
    out.push(b':');
    out.extend_from_slice(segment.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(segment.as_bytes());
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.write_str(path),
            Self::Batch(paths) => write!(f, "[{}]", paths.join(", ")),
        }
    }
}

impl From<&str> for LookupKey {
    fn from(path: &str) -> Self {
        Self::path(path)
    }
}

// ============================================================================
// LOOKUP CONTRACT
// ============================================================================

/// A translation lookup.
///
/// Implementations signal "no translation exists" with
/// [`TranslateError::Missing`]. Decorators such as the caching layer
/// implement this trait too, so they stack.
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        locale: &Locale,
        key: &LookupKey,
        options: &TranslateOptions,
    ) -> TranslateResult<TranslationValue>;
}

impl<T: Translator + ?Sized> Translator for Arc<T> {
    fn translate(
        &self,
        locale: &Locale,
        key: &LookupKey,
        options: &TranslateOptions,
    ) -> TranslateResult<TranslationValue> {
        (**self).translate(locale, key, options)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(
        &self,
        locale: &Locale,
        key: &LookupKey,
        options: &TranslateOptions,
    ) -> TranslateResult<TranslationValue> {
        (**self).translate(locale, key, options)
    }
}
