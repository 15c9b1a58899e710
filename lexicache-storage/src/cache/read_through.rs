//! Read-through caching for translation lookups.
//!
//! [`CachedTranslator`] wraps any [`Translator`] and implements the same
//! trait. On a miss it runs the wrapped lookup and stores the outcome under
//! the lookup's fingerprint; on a hit it decodes the stored outcome.
//!
//! A missing translation is an outcome like any other: it is stored, and
//! every later hit re-signals it as [`TranslateError::Missing`], exactly as
//! the first lookup did. Every other lookup failure propagates and is never
//! stored. Store failures propagate too; there is no uncached fallback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lexicache_core::{
    CacheConfig, LookupKey, Locale, MissingTranslation, StoreError, TranslateError,
    TranslateOptions, TranslateResult, TranslationValue, Translator,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::fingerprint::Fingerprint;
use super::traits::{CacheStats, CacheStore};
use super::version::VersionManager;

/// What the store holds for a fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachedOutcome {
    Found(TranslationValue),
    Missing(MissingTranslation),
}

impl CachedOutcome {
    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(self).map_err(|e| StoreError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Decode a stored entry.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Turn the outcome back into what the wrapped lookup returned.
    pub fn into_result(self) -> TranslateResult<TranslationValue> {
        match self {
            Self::Found(value) => Ok(value),
            Self::Missing(missing) => Err(TranslateError::Missing(missing)),
        }
    }
}

#[derive(Debug, Default)]
struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    missing_replays: AtomicU64,
    bypasses: AtomicU64,
}

impl StatsCounters {
    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            missing_replays: self.missing_replays.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
        }
    }
}

struct CacheLayer<S: CacheStore + ?Sized> {
    store: Arc<S>,
    versions: Arc<VersionManager<S>>,
    config: CacheConfig,
}

/// Caching decorator over a translation lookup.
///
/// # Type Parameters
///
/// - `T`: The wrapped translator
/// - `S`: The cache store; `dyn CacheStore` when picked at runtime
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let cached = CachedTranslator::new(backend, store, CacheConfig::from_env()?);
///
/// let hello = cached.translate(&Locale::new("en"), &LookupKey::path("greeting"), &TranslateOptions::new())?;
///
/// // Every process sees fresh lookups once its epoch snapshot expires.
/// cached.invalidate()?;
/// ```
pub struct CachedTranslator<T, S: CacheStore + ?Sized = dyn CacheStore> {
    inner: T,
    cache: Option<CacheLayer<S>>,
    stats: StatsCounters,
}

impl<T: Translator> CachedTranslator<T, dyn CacheStore> {
    /// A decorator with no store: every lookup goes straight to `inner`.
    pub fn uncached(inner: T) -> Self {
        Self {
            inner,
            cache: None,
            stats: StatsCounters::default(),
        }
    }
}

impl<T: Translator, S: CacheStore + ?Sized> CachedTranslator<T, S> {
    /// Create a caching decorator with its own version manager.
    pub fn new(inner: T, store: Arc<S>, config: CacheConfig) -> Self {
        let versions = Arc::new(VersionManager::new(Arc::clone(&store), &config));
        Self::with_versions(inner, store, versions, config)
    }

    /// Create a caching decorator sharing an existing version manager.
    ///
    /// `versions` must manage the epoch of `store`.
    pub fn with_versions(
        inner: T,
        store: Arc<S>,
        versions: Arc<VersionManager<S>>,
        config: CacheConfig,
    ) -> Self {
        Self {
            inner,
            cache: Some(CacheLayer {
                store,
                versions,
                config,
            }),
            stats: StatsCounters::default(),
        }
    }

    /// Create a decorator from an optional store handle.
    pub fn from_store(inner: T, store: Option<Arc<S>>, config: CacheConfig) -> Self {
        match store {
            Some(store) => Self::new(inner, store, config),
            None => Self {
                inner,
                cache: None,
                stats: StatsCounters::default(),
            },
        }
    }

    /// The wrapped translator.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Returns true if a store is configured.
    pub fn is_caching_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// The version manager, if caching is enabled.
    pub fn versions(&self) -> Option<&Arc<VersionManager<S>>> {
        self.cache.as_ref().map(|layer| &layer.versions)
    }

    /// The cache configuration, if caching is enabled.
    pub fn config(&self) -> Option<&CacheConfig> {
        self.cache.as_ref().map(|layer| &layer.config)
    }

    /// Usage counters since construction.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Invalidate every cached outcome by bumping the epoch.
    ///
    /// Returns the new epoch, or `None` if caching is disabled.
    pub fn invalidate(&self) -> TranslateResult<Option<i64>> {
        match &self.cache {
            Some(layer) => Ok(Some(layer.versions.invalidate()?)),
            None => Ok(None),
        }
    }

    /// The fingerprint of a lookup under the current epoch.
    ///
    /// Returns `None` if caching is disabled or the options cannot be
    /// fingerprinted. Options are checked before the epoch is read, so an
    /// uncacheable lookup never touches the store.
    pub fn fingerprint(
        &self,
        locale: &Locale,
        key: &LookupKey,
        options: &TranslateOptions,
    ) -> TranslateResult<Option<Fingerprint>> {
        let Some(layer) = &self.cache else {
            return Ok(None);
        };
        if !options.is_cacheable() {
            return Ok(None);
        }
        let epoch = layer.versions.current_epoch()?;
        Ok(Fingerprint::compose(
            &layer.config.key_prefix,
            layer.config.namespace.as_deref(),
            locale,
            key,
            options,
            epoch,
        ))
    }

    /// Serve `fingerprint` from the store, running `compute` on a miss.
    ///
    /// A [`TranslateError::Missing`] from `compute` is stored and then
    /// returned. Any other error from `compute` is returned without storing.
    /// With caching disabled this simply runs `compute`.
    pub fn fetch_or_compute<F>(
        &self,
        fingerprint: &Fingerprint,
        mut compute: F,
    ) -> TranslateResult<TranslationValue>
    where
        F: FnMut() -> TranslateResult<TranslationValue>,
    {
        let Some(layer) = &self.cache else {
            return compute();
        };

        let mut computed: Option<CachedOutcome> = None;
        let bytes = layer.store.fetch(fingerprint.as_str(), &mut || -> TranslateResult<Vec<u8>> {
            let outcome = match compute() {
                Ok(value) => CachedOutcome::Found(value),
                Err(TranslateError::Missing(missing)) => CachedOutcome::Missing(missing),
                Err(other) => return Err(other),
            };
            let bytes = outcome.to_bytes()?;
            computed = Some(outcome);
            Ok(bytes)
        })?;

        let outcome = match computed {
            Some(outcome) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(%fingerprint, "translation cache miss");
                outcome
            }
            None => {
                let outcome = CachedOutcome::from_bytes(&bytes)?;
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                if matches!(outcome, CachedOutcome::Missing(_)) {
                    self.stats.missing_replays.fetch_add(1, Ordering::Relaxed);
                    debug!(%fingerprint, "translation cache hit (missing translation)");
                } else {
                    debug!(%fingerprint, "translation cache hit");
                }
                outcome
            }
        };

        outcome.into_result()
    }

    fn bypass(
        &self,
        locale: &Locale,
        key: &LookupKey,
        options: &TranslateOptions,
        reason: &'static str,
    ) -> TranslateResult<TranslationValue> {
        self.stats.bypasses.fetch_add(1, Ordering::Relaxed);
        debug!(%locale, %key, reason, "translation cache bypassed");
        self.inner.translate(locale, key, options)
    }
}

impl<T: Translator, S: CacheStore + ?Sized> Translator for CachedTranslator<T, S> {
    fn translate(
        &self,
        locale: &Locale,
        key: &LookupKey,
        options: &TranslateOptions,
    ) -> TranslateResult<TranslationValue> {
        if self.cache.is_none() {
            return self.bypass(locale, key, options, "caching disabled");
        }
        match self.fingerprint(locale, key, options)? {
            Some(fingerprint) => self.fetch_or_compute(&fingerprint, || {
                self.inner.translate(locale, key, options)
            }),
            None => self.bypass(locale, key, options, "uncacheable options"),
        }
    }
}
