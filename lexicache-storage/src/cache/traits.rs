//! Cache store trait and usage statistics.
//!
//! This module defines the contract the caching layer needs from its
//! key-value backend. Anything that can read, write, add-if-missing and
//! atomically increment can back the cache.

use lexicache_core::{StoreResult, TranslateResult};

/// Key-value backend for cached outcomes and the invalidation epoch.
///
/// # Value Formats
///
/// Cached outcomes are opaque bytes produced by the caching layer. Integer
/// ("raw") values are stored as their decimal digits, unwrapped, so that
/// backends with native counters can operate on them directly.
///
/// # Atomicity
///
/// `write_raw_if_absent` and `increment` must be atomic with respect to
/// every other writer of the same store. `fetch` only needs at-least-once
/// fill semantics: two concurrent misses may both run `fill`.
pub trait CacheStore: Send + Sync {
    /// Read a value. Returns `None` if the key is absent.
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write a value, replacing any previous one.
    fn write(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Read an integer value as its raw stored bytes.
    fn read_raw(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.read(key)
    }

    /// Store an integer verbatim.
    fn write_raw(&self, key: &str, value: i64) -> StoreResult<()> {
        self.write(key, value.to_string().as_bytes())
    }

    /// Store an integer only if the key is absent.
    ///
    /// Returns true if the value was written.
    fn write_raw_if_absent(&self, key: &str, value: i64) -> StoreResult<bool>;

    /// Atomically add one to an integer value and return the result.
    ///
    /// An absent or non-numeric value counts as 0.
    fn increment(&self, key: &str) -> StoreResult<i64>;

    /// Read-through fetch.
    ///
    /// Returns the stored bytes for `key` if present. Otherwise runs `fill`,
    /// stores its bytes under `key` and returns them. If `fill` fails the
    /// error is returned and nothing is stored.
    fn fetch(
        &self,
        key: &str,
        fill: &mut dyn FnMut() -> TranslateResult<Vec<u8>>,
    ) -> TranslateResult<Vec<u8>> {
        if let Some(bytes) = self.read(key)? {
            return Ok(bytes);
        }
        let bytes = fill()?;
        self.write(key, &bytes)?;
        Ok(bytes)
    }
}

/// Parse a raw integer value. Surrounding whitespace is ignored.
pub fn parse_raw_integer(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the store.
    pub hits: u64,
    /// Lookups that ran the wrapped translator and filled the store.
    pub misses: u64,
    /// Hits whose cached outcome was a missing translation.
    pub missing_replays: u64,
    /// Lookups that skipped the cache entirely.
    pub bypasses: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_raw_integer() {
        assert_eq!(parse_raw_integer(b"0"), Some(0));
        assert_eq!(parse_raw_integer(b"42"), Some(42));
        assert_eq!(parse_raw_integer(b" 7\n"), Some(7));
        assert_eq!(parse_raw_integer(b"-3"), Some(-3));
        assert_eq!(parse_raw_integer(b"seven"), None);
        assert_eq!(parse_raw_integer(b""), None);
        assert_eq!(parse_raw_integer(&[0xff, 0xfe]), None);
    }
}
