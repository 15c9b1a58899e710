//! lexicache Test Utilities
//!
//! Shared test infrastructure for the lexicache workspace:
//! - Mock translators and stores
//! - Proptest generators for lookups and options
//! - Fixtures for common scenarios
//! - Assertions for translation outcomes

// Re-export core types for convenience
pub use lexicache_core::{
    CacheConfig, Callback, ConfigError, LookupError, LookupKey, Locale, MissingTranslation,
    OptionValue, StoreError, StoreResult, TranslateError, TranslateOptions, TranslateResult,
    TranslationValue, Translator,
};

// Re-export store types from their source crate
pub use lexicache_storage::{
    CacheStore, CachedTranslator, Clock, ManualClock, MemoryStore, VersionManager,
};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// MOCK TRANSLATORS
// ============================================================================

/// In-memory translation table that counts how often it is consulted.
///
/// Batch keys resolve to an array of their paths' values and fail as missing
/// if any path is absent.
#[derive(Debug, Default)]
pub struct StaticTranslator {
    table: HashMap<(String, String), TranslationValue>,
    calls: AtomicUsize,
}

impl StaticTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation.
    pub fn with(mut self, locale: &str, path: &str, value: impl Into<TranslationValue>) -> Self {
        self.insert(locale, path, value);
        self
    }

    pub fn insert(&mut self, locale: &str, path: &str, value: impl Into<TranslationValue>) {
        self.table
            .insert((locale.to_string(), path.to_string()), value.into());
    }

    /// Number of lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn resolve(&self, locale: &Locale, path: &str) -> Option<TranslationValue> {
        self.table
            .get(&(locale.as_str().to_string(), path.to_string()))
            .cloned()
    }
}

impl Translator for StaticTranslator {
    fn translate(
        &self,
        locale: &Locale,
        key: &LookupKey,
        _options: &TranslateOptions,
    ) -> TranslateResult<TranslationValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let missing = || MissingTranslation::new(locale.clone(), key.clone());
        match key {
            LookupKey::Path(path) => self.resolve(locale, path).ok_or_else(|| missing().into()),
            LookupKey::Batch(paths) => {
                let values = paths
                    .iter()
                    .map(|path| self.resolve(locale, path).ok_or_else(missing))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TranslationValue::Array(values))
            }
        }
    }
}

/// Translator whose backend is always down.
#[derive(Debug, Default)]
pub struct FailingTranslator {
    calls: AtomicUsize,
}

impl FailingTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Translator for FailingTranslator {
    fn translate(
        &self,
        _locale: &Locale,
        _key: &LookupKey,
        _options: &TranslateOptions,
    ) -> TranslateResult<TranslationValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LookupError::new("translation backend unavailable").into())
    }
}

// ============================================================================
// MOCK STORES
// ============================================================================

/// A store operation observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Read(String),
    Write(String),
    WriteIfAbsent(String),
    Increment(String),
}

/// Wraps a store and records every operation made through it.
#[derive(Debug, Default)]
pub struct RecordingStore<S = MemoryStore> {
    inner: S,
    ops: Mutex<Vec<StoreOp>>,
}

impl<S: CacheStore> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            ops: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Operations recorded so far, oldest first.
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    pub fn clear_ops(&self) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.clear();
        }
    }

    /// Number of recorded writes of cached outcomes.
    pub fn writes(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, StoreOp::Write(_)))
            .count()
    }

    fn record(&self, op: StoreOp) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }
}

impl<S: CacheStore> CacheStore for RecordingStore<S> {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.record(StoreOp::Read(key.to_string()));
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.record(StoreOp::Write(key.to_string()));
        self.inner.write(key, value)
    }

    fn write_raw_if_absent(&self, key: &str, value: i64) -> StoreResult<bool> {
        self.record(StoreOp::WriteIfAbsent(key.to_string()));
        self.inner.write_raw_if_absent(key, value)
    }

    fn increment(&self, key: &str) -> StoreResult<i64> {
        self.record(StoreOp::Increment(key.to_string()));
        self.inner.increment(key)
    }
}

/// A store that rejects every operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl UnavailableStore {
    fn error() -> StoreError {
        StoreError::Unavailable {
            reason: "connection refused".to_string(),
        }
    }
}

impl CacheStore for UnavailableStore {
    fn read(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
        Err(Self::error())
    }

    fn write(&self, _key: &str, _value: &[u8]) -> StoreResult<()> {
        Err(Self::error())
    }

    fn write_raw_if_absent(&self, _key: &str, _value: i64) -> StoreResult<bool> {
        Err(Self::error())
    }

    fn increment(&self, _key: &str) -> StoreResult<i64> {
        Err(Self::error())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for lookup inputs.

    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// Generate a locale code such as `en` or `pt-BR`.
    pub fn arb_locale() -> impl Strategy<Value = Locale> {
        prop_oneof![
            "[a-z]{2}".prop_map(Locale::new),
            ("[a-z]{2}", "[A-Z]{2}").prop_map(|(lang, region)| Locale::new(format!("{lang}-{region}"))),
        ]
    }

    /// Generate a dotted key path.
    pub fn arb_path() -> impl Strategy<Value = String> {
        proptest::collection::vec("[a-z_]{1,8}", 1..4).prop_map(|parts| parts.join("."))
    }

    /// Generate a single or batch lookup key.
    pub fn arb_lookup_key() -> impl Strategy<Value = LookupKey> {
        prop_oneof![
            3 => arb_path().prop_map(LookupKey::Path),
            1 => proptest::collection::vec(arb_path(), 1..4).prop_map(LookupKey::Batch),
        ]
    }

    /// Generate a plain option value.
    pub fn arb_option_value() -> impl Strategy<Value = TranslationValue> {
        prop_oneof![
            any::<bool>().prop_map(|b| json!(b)),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z ]{0,12}".prop_map(|s| json!(s)),
            proptest::collection::vec("[a-z]{1,4}", 0..3).prop_map(|v| json!(v)),
        ]
    }

    /// Generate cacheable options.
    pub fn arb_options() -> impl Strategy<Value = TranslateOptions> {
        proptest::collection::btree_map("[a-z_]{1,8}", arb_option_value(), 0..5)
            .prop_map(|entries| entries.into_iter().collect())
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common scenarios.

    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    /// A small English and German table.
    pub fn greeting_translator() -> StaticTranslator {
        StaticTranslator::new()
            .with("en", "greeting", "Hello")
            .with("en", "farewell", "Goodbye")
            .with("en", "nav", json!({"home": "Home", "about": "About"}))
            .with("de", "greeting", "Hallo")
    }

    /// A caching translator over an in-memory store driven by a manual clock.
    pub fn cached_with_clock<T: Translator>(
        inner: T,
        config: CacheConfig,
    ) -> (
        Arc<MemoryStore>,
        Arc<ManualClock>,
        CachedTranslator<T, MemoryStore>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::default());
        let versions = Arc::new(VersionManager::with_clock(
            Arc::clone(&store),
            &config,
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));
        let cached = CachedTranslator::with_versions(inner, Arc::clone(&store), versions, config);
        (store, clock, cached)
    }

    pub fn en() -> Locale {
        Locale::new("en")
    }

    pub fn no_options() -> TranslateOptions {
        TranslateOptions::new()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for translation outcomes.

    use super::*;

    /// Assert that a lookup failed as a missing translation for `locale` and `key`.
    #[track_caller]
    pub fn assert_missing<T: std::fmt::Debug>(
        result: &TranslateResult<T>,
        locale: &Locale,
        key: &LookupKey,
    ) {
        match result {
            Err(TranslateError::Missing(missing)) => {
                assert_eq!(&missing.locale, locale, "Wrong locale in missing translation");
                assert_eq!(&missing.key, key, "Wrong key in missing translation");
            }
            other => panic!("Expected missing translation for {locale}.{key}, got: {other:?}"),
        }
    }

    /// Assert that a lookup failed with a store error.
    #[track_caller]
    pub fn assert_store_error<T: std::fmt::Debug>(result: &TranslateResult<T>) {
        match result {
            Err(TranslateError::Store(_)) => {}
            other => panic!("Expected Store error, got: {other:?}"),
        }
    }

    /// Assert that a lookup failed in the wrapped translator.
    #[track_caller]
    pub fn assert_lookup_error<T: std::fmt::Debug>(result: &TranslateResult<T>) {
        match result {
            Err(TranslateError::Lookup(_)) => {}
            other => panic!("Expected Lookup error, got: {other:?}"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_static_translator_path() {
        let translator = fixtures::greeting_translator();
        let value = translator
            .translate(&fixtures::en(), &LookupKey::path("greeting"), &fixtures::no_options())
            .expect("greeting exists");
        assert_eq!(value, json!("Hello"));
        assert_eq!(translator.calls(), 1);
    }

    #[test]
    fn test_static_translator_batch() {
        let translator = fixtures::greeting_translator();
        let value = translator
            .translate(
                &fixtures::en(),
                &LookupKey::batch(["greeting", "farewell"]),
                &fixtures::no_options(),
            )
            .expect("both paths exist");
        assert_eq!(value, json!(["Hello", "Goodbye"]));

        let key = LookupKey::batch(["greeting", "absent"]);
        let result = translator.translate(&fixtures::en(), &key, &fixtures::no_options());
        assertions::assert_missing(&result, &fixtures::en(), &key);
    }

    #[test]
    fn test_failing_translator() {
        let translator = FailingTranslator::new();
        let result = translator.translate(&fixtures::en(), &LookupKey::path("k"), &fixtures::no_options());
        assertions::assert_lookup_error(&result);
        assert_eq!(translator.calls(), 1);
    }

    #[test]
    fn test_recording_store_records_ops() {
        let store = RecordingStore::new(MemoryStore::new());
        store.write_raw_if_absent("epoch", 0).expect("add should succeed");
        store.increment("epoch").expect("increment should succeed");
        store.read("epoch").expect("read should succeed");

        assert_eq!(
            store.ops(),
            vec![
                StoreOp::WriteIfAbsent("epoch".to_string()),
                StoreOp::Increment("epoch".to_string()),
                StoreOp::Read("epoch".to_string()),
            ]
        );
        store.clear_ops();
        assert!(store.ops().is_empty());
    }

    #[test]
    fn test_unavailable_store_rejects_everything() {
        let store = UnavailableStore;
        assert!(store.read("k").is_err());
        assert!(store.write("k", b"v").is_err());
        assert!(store.increment("k").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_generated_options_are_cacheable(options in generators::arb_options()) {
            prop_assert!(options.is_cacheable());
            prop_assert!(options.digest().is_some());
        }

        #[test]
        fn prop_generated_keys_have_digests(key in generators::arb_lookup_key()) {
            prop_assert_eq!(key.digest().len(), 32);
        }
    }
}
