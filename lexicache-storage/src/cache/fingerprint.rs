//! Fingerprints: the store keys of cached lookup outcomes.
//!
//! # Format
//!
//! ```text
//! {prefix}/{namespace}/{locale}/{key digest}/{options digest}/{epoch}
//! ```
//!
//! An absent namespace leaves its segment empty (`i18n//en/...`). The prefix,
//! namespace and locale are escaped (`%` as `%25`, `/` as `%2F`), so every
//! fingerprint splits back into exactly six segments. Digests are
//! 32 lowercase hex characters over the canonical encodings defined in
//! `lexicache_core`, so option maps compare by content. Embedding the epoch
//! means a bumped epoch never reaches an older entry.

use std::fmt;

use lexicache_core::{LookupKey, Locale, TranslateOptions};

/// Separator between fingerprint segments.
pub const SEPARATOR: char = '/';

/// A cache key for one lookup under one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    key: String,
    epoch: i64,
}

impl Fingerprint {
    /// Derive the fingerprint of a lookup.
    ///
    /// Returns `None` when the options hold a callback and therefore have no
    /// canonical form.
    pub fn compose(
        prefix: &str,
        namespace: Option<&str>,
        locale: &Locale,
        key: &LookupKey,
        options: &TranslateOptions,
        epoch: i64,
    ) -> Option<Self> {
        let options_digest = options.digest()?;
        let segments = [
            escape_segment(prefix),
            escape_segment(namespace.unwrap_or_default()),
            escape_segment(locale.as_str()),
            key.digest(),
            options_digest,
            epoch.to_string(),
        ];

        let mut out = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            out.push_str(segment);
        }

        Some(Self { key: out, epoch })
    }

    /// The store key.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The epoch this fingerprint was derived under.
    pub fn epoch(&self) -> i64 {
        self.epoch
    }
}

/// Escape free-form text so it cannot contain [`SEPARATOR`].
fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => out.push_str("%25"),
            SEPARATOR => out.push_str("%2F"),
            other => out.push(other),
        }
    }
    out
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicache_core::Callback;
    use proptest::prelude::*;
    use serde_json::json;

    fn compose(
        namespace: Option<&str>,
        locale: &str,
        key: &str,
        options: &TranslateOptions,
        epoch: i64,
    ) -> Fingerprint {
        Fingerprint::compose(
            "i18n",
            namespace,
            &Locale::new(locale),
            &LookupKey::path(key),
            options,
            epoch,
        )
        .expect("options are cacheable")
    }

    #[test]
    fn test_layout_without_namespace() {
        let fp = compose(None, "en", "greeting", &TranslateOptions::new(), 0);
        let segments: Vec<&str> = fp.as_str().split(SEPARATOR).collect();

        assert_eq!(segments.len(), 6);
        assert_eq!(segments[0], "i18n");
        assert_eq!(segments[1], "");
        assert_eq!(segments[2], "en");
        assert_eq!(segments[3], LookupKey::path("greeting").digest());
        assert_eq!(segments[4].len(), 32);
        assert_eq!(segments[5], "0");
        assert!(fp.as_str().starts_with("i18n//en/"));
    }

    #[test]
    fn test_layout_with_namespace() {
        let fp = compose(Some("storefront"), "de", "greeting", &TranslateOptions::new(), 4);
        assert!(fp.as_str().starts_with("i18n/storefront/de/"));
        assert!(fp.as_str().ends_with("/4"));
        assert_eq!(fp.epoch(), 4);
    }

    #[test]
    fn test_namespace_partitions() {
        let options = TranslateOptions::new();
        assert_ne!(
            compose(Some("a"), "en", "greeting", &options, 0),
            compose(Some("b"), "en", "greeting", &options, 0)
        );
        assert_ne!(
            compose(None, "en", "greeting", &options, 0),
            compose(Some("a"), "en", "greeting", &options, 0)
        );
    }

    #[test]
    fn test_separator_in_namespace_or_locale_does_not_collide() {
        let options = TranslateOptions::new();
        let a = compose(Some("a"), "b/c", "greeting", &options, 0);
        let b = compose(Some("a/b"), "c", "greeting", &options, 0);

        assert_ne!(a, b);
        assert_eq!(a.as_str().split(SEPARATOR).count(), 6);
        assert_eq!(b.as_str().split(SEPARATOR).count(), 6);
        assert!(a.as_str().starts_with("i18n/a/b%2Fc/"));
        assert!(b.as_str().starts_with("i18n/a%2Fb/c/"));
    }

    #[test]
    fn test_escape_is_injective_for_percent() {
        let options = TranslateOptions::new();
        assert_ne!(
            compose(Some("a%2Fb"), "c", "k", &options, 0),
            compose(Some("a/b"), "c", "k", &options, 0)
        );
        assert_eq!(escape_segment("50%/x"), "50%25%2Fx");
    }

    #[test]
    fn test_epoch_partitions() {
        let options = TranslateOptions::new();
        assert_ne!(
            compose(None, "en", "greeting", &options, 0),
            compose(None, "en", "greeting", &options, 1)
        );
    }

    #[test]
    fn test_options_by_content() {
        let a = TranslateOptions::new().with("name", "Ada").with("count", 2i64);
        let b = TranslateOptions::new().with("count", 2i64).with("name", "Ada");
        assert_eq!(compose(None, "en", "k", &a, 0), compose(None, "en", "k", &b, 0));
    }

    #[test]
    fn test_callback_options_have_no_fingerprint() {
        let options = TranslateOptions::new().with("default", Callback::new(|_, _| json!("x")));
        let fp = Fingerprint::compose(
            "i18n",
            None,
            &Locale::new("en"),
            &LookupKey::path("k"),
            &options,
            0,
        );
        assert!(fp.is_none());
    }

    fn options_strategy() -> impl Strategy<Value = TranslateOptions> {
        proptest::collection::btree_map("[a-z]{1,6}", "[a-zA-Z0-9 ]{0,12}", 0..5).prop_map(|m| {
            m.into_iter()
                .map(|(k, v)| (k, json!(v)))
                .collect::<TranslateOptions>()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Property: identical inputs always yield the same fingerprint.
        #[test]
        fn prop_fingerprint_deterministic(
            locale in "[a-z]{2}",
            key in "[a-z_.]{1,20}",
            options in options_strategy(),
            epoch in 0i64..1_000,
        ) {
            let first = compose(None, &locale, &key, &options, epoch);
            let second = compose(None, &locale, &key, &options.clone(), epoch);
            prop_assert_eq!(first, second);
        }

        /// Property: changing the locale changes the fingerprint.
        #[test]
        fn prop_locale_sensitive(
            a in "[a-z]{2}",
            b in "[a-z]{2}",
            key in "[a-z_.]{1,20}",
        ) {
            prop_assume!(a != b);
            let options = TranslateOptions::new();
            prop_assert_ne!(compose(None, &a, &key, &options, 0), compose(None, &b, &key, &options, 0));
        }

        /// Property: namespace and locale never bleed into each other.
        #[test]
        fn prop_segments_stay_separate(
            ns_a in "[a-z/%]{0,6}",
            loc_a in "[a-z/%]{1,6}",
            ns_b in "[a-z/%]{0,6}",
            loc_b in "[a-z/%]{1,6}",
        ) {
            prop_assume!((ns_a.as_str(), loc_a.as_str()) != (ns_b.as_str(), loc_b.as_str()));
            let options = TranslateOptions::new();
            prop_assert_ne!(
                compose(Some(ns_a.as_str()), &loc_a, "k", &options, 0),
                compose(Some(ns_b.as_str()), &loc_b, "k", &options, 0)
            );
        }

        /// Property: changing the key changes the fingerprint.
        #[test]
        fn prop_key_sensitive(
            a in "[a-z_.]{1,20}",
            b in "[a-z_.]{1,20}",
        ) {
            prop_assume!(a != b);
            let options = TranslateOptions::new();
            prop_assert_ne!(compose(None, "en", &a, &options, 0), compose(None, "en", &b, &options, 0));
        }

        /// Property: changing one option value changes the fingerprint.
        #[test]
        fn prop_option_value_sensitive(
            base in options_strategy(),
            name in "[a-z]{1,6}",
            a in "[a-z]{1,8}",
            b in "[a-z]{1,8}",
        ) {
            prop_assume!(a != b);
            let mut with_a = base.clone();
            with_a.insert(name.clone(), json!(a));
            let mut with_b = base;
            with_b.insert(name, json!(b));
            prop_assert_ne!(compose(None, "en", "k", &with_a, 0), compose(None, "en", "k", &with_b, 0));
        }
    }
}
