//! Lookup options and their canonical form.
//!
//! Options are compared by content, never by identity. Two option maps with
//! the same entries produce the same canonical bytes no matter how they were
//! built. A [`Callback`] has no canonical form: options holding one cannot be
//! fingerprinted, and the caching layer bypasses the cache for them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{compute_digest, LookupKey, Locale, TranslationValue};

type CallbackFn = dyn Fn(&Locale, &LookupKey) -> TranslationValue + Send + Sync;

/// An option computed at lookup time, e.g. a dynamic default.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Locale, &LookupKey) -> TranslationValue + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, locale: &Locale, key: &LookupKey) -> TranslationValue {
        (self.0)(locale, key)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A single option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Value(Value),
    Callback(Callback),
}

impl OptionValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Callback(_) => None,
        }
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<Callback> for OptionValue {
    fn from(callback: Callback) -> Self {
        Self::Callback(callback)
    }
}

/// Options passed alongside a lookup: interpolation variables, `count`,
/// `scope`, `default`, and so on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateOptions {
    entries: BTreeMap<String, OptionValue>,
}

impl TranslateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&String, &OptionValue)> {
        self.entries.iter()
    }

    /// True when every option has a canonical form.
    pub fn is_cacheable(&self) -> bool {
        self.entries
            .values()
            .all(|v| matches!(v, OptionValue::Value(_)))
    }

    /// Canonical JSON encoding, or `None` if any option is a callback.
    ///
    /// Map keys are emitted in sorted order at every nesting level.
    pub fn canonical_bytes(&self) -> Option<Vec<u8>> {
        let mut map = Map::new();
        for (name, value) in &self.entries {
            map.insert(name.clone(), canonicalize(value.as_value()?));
        }
        serde_json::to_vec(&Value::Object(map)).ok()
    }

    /// Digest of [`Self::canonical_bytes`].
    pub fn digest(&self) -> Option<String> {
        self.canonical_bytes().map(|bytes| compute_digest(&bytes))
    }
}

impl<K, V> FromIterator<(K, V)> for TranslateOptions
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, value) in iter {
            options.insert(name, value);
        }
        options
    }
}

/// Rebuild a JSON value with object keys inserted in sorted order.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(obj) => {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                if let Some(inner) = obj.get(key) {
                    out.insert(key.clone(), canonicalize(inner));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_empty_options_are_cacheable() {
        let options = TranslateOptions::new();
        assert!(options.is_cacheable());
        assert_eq!(options.canonical_bytes(), Some(b"{}".to_vec()));
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = TranslateOptions::new()
            .with("count", 3i64)
            .with("scope", "nav");
        let b = TranslateOptions::new()
            .with("scope", "nav")
            .with("count", 3i64);
        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_iter_is_sorted_both_ways() {
        let options = TranslateOptions::new().with("b", 2i64).with("a", 1i64).with("c", 3i64);
        let forward: Vec<&str> = options.iter().map(|(name, _)| name.as_str()).collect();
        let backward: Vec<&str> = options.iter().rev().map(|(name, _)| name.as_str()).collect();

        assert_eq!(forward, ["a", "b", "c"]);
        assert_eq!(backward, ["c", "b", "a"]);
    }

    #[test]
    fn test_nested_objects_are_sorted() {
        let options = TranslateOptions::new().with("default", json!({"z": 1, "a": {"y": 2, "b": 3}}));
        let bytes = options.canonical_bytes().expect("options are cacheable");
        assert_eq!(
            String::from_utf8(bytes).expect("canonical bytes are utf-8"),
            r#"{"default":{"a":{"b":3,"y":2},"z":1}}"#
        );
    }

    #[test]
    fn test_value_change_changes_digest() {
        let one = TranslateOptions::new().with("count", 1i64);
        let two = TranslateOptions::new().with("count", 2i64);
        assert_ne!(one.digest(), two.digest());
    }

    #[test]
    fn test_callback_makes_options_uncacheable() {
        let options = TranslateOptions::new()
            .with("scope", "nav")
            .with("default", Callback::new(|_, _| json!("fallback")));
        assert!(!options.is_cacheable());
        assert!(options.canonical_bytes().is_none());
        assert!(options.digest().is_none());
    }

    #[test]
    fn test_callback_equality_is_by_identity() {
        let cb = Callback::new(|_, _| json!(null));
        let same = cb.clone();
        let other = Callback::new(|_, _| json!(null));
        assert_eq!(cb, same);
        assert_ne!(cb, other);
    }

    #[test]
    fn test_callback_invocation() {
        let cb = Callback::new(|locale, key| json!(format!("{locale}:{key}")));
        assert_eq!(
            cb.call(&Locale::new("en"), &LookupKey::path("title")),
            json!("en:title")
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Property: options built in any order share one canonical form.
        #[test]
        fn prop_options_order_independent(
            entries in proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..8)
        ) {
            let forward: TranslateOptions = entries.iter().map(|(k, v)| (k.clone(), *v)).collect();
            let reverse: TranslateOptions = entries.iter().rev().map(|(k, v)| (k.clone(), *v)).collect();
            prop_assert_eq!(forward.digest(), reverse.digest());
        }
    }
}
