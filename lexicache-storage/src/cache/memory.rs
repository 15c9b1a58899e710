//! In-process cache store.
//!
//! Backed by a `HashMap` under a `RwLock`. Counter operations hold the write
//! lock for their whole read-modify-write, which makes them atomic for every
//! user of the same `MemoryStore` instance.

use std::collections::HashMap;
use std::sync::RwLock;

use lexicache_core::{StoreError, StoreResult};

use super::traits::{parse_raw_integer, CacheStore};

/// In-memory cache store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys, counters included.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self
            .entries
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .len())
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every entry, counters included.
    pub fn clear(&self) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .clear();
        Ok(())
    }

    /// Returns true if `key` is present.
    pub fn contains_key(&self, key: &str) -> StoreResult<bool> {
        Ok(self
            .entries
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .contains_key(key))
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn write_raw_if_absent(&self, key: &str, value: i64) -> StoreResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string().into_bytes());
        Ok(true)
    }

    fn increment(&self, key: &str) -> StoreResult<i64> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let current = entries
            .get(key)
            .and_then(|bytes| parse_raw_integer(bytes))
            .unwrap_or(0);
        let next = current.saturating_add(1);
        entries.insert(key.to_string(), next.to_string().into_bytes());
        Ok(next)
    }
}
