//! LMDB-backed cache store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a memory-mapped,
//! persistent key-value store that several processes on one host can share.
//!
//! # Atomicity
//!
//! LMDB allows a single write transaction at a time per environment. Every
//! mutation here runs inside one write transaction, so `increment` and
//! `write_raw_if_absent` are atomic across threads and across processes
//! opening the same directory.

use std::path::Path;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};
use lexicache_core::{StoreError, StoreResult};

use super::traits::{parse_raw_integer, CacheStore};

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open the database within the environment.
    #[error("Failed to open database: {0}")]
    DbOpen(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert LmdbStoreError to StoreError.
impl From<LmdbStoreError> for StoreError {
    fn from(e: LmdbStoreError) -> Self {
        match e {
            LmdbStoreError::Transaction(reason) => StoreError::Transaction { reason },
            other => StoreError::Unavailable {
                reason: other.to_string(),
            },
        }
    }
}

fn txn_error(e: heed::Error) -> StoreError {
    LmdbStoreError::Transaction(e.to_string()).into()
}

/// LMDB-backed cache store.
///
/// # Example
///
/// ```ignore
/// use lexicache_storage::cache::{CacheStore, LmdbStore};
///
/// let store = LmdbStore::open("/var/cache/lexicache", 64)?;
/// store.write_raw_if_absent("i18n/cache_version", 0)?;
/// let epoch = store.increment("i18n/cache_version")?;
/// ```
pub struct LmdbStore {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Str, Bytes>,
}

impl LmdbStore {
    /// Open (or create) an LMDB store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let db: Database<Str, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(Self { env, db })
    }

    /// Number of stored keys, counters included.
    pub fn len(&self) -> StoreResult<u64> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        self.db.len(&rtxn).map_err(txn_error)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every entry, counters included.
    pub fn clear(&self) -> StoreResult<()> {
        let mut wtxn = self.env.write_txn().map_err(txn_error)?;
        self.db.clear(&mut wtxn).map_err(txn_error)?;
        wtxn.commit().map_err(txn_error)
    }
}

impl CacheStore for LmdbStore {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        let value = self.db.get(&rtxn, key).map_err(txn_error)?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn write(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut wtxn = self.env.write_txn().map_err(txn_error)?;
        self.db.put(&mut wtxn, key, value).map_err(txn_error)?;
        wtxn.commit().map_err(txn_error)
    }

    fn write_raw_if_absent(&self, key: &str, value: i64) -> StoreResult<bool> {
        let mut wtxn = self.env.write_txn().map_err(txn_error)?;
        let exists = self.db.get(&wtxn, key).map_err(txn_error)?.is_some();
        if exists {
            // Dropping the transaction aborts it.
            return Ok(false);
        }
        self.db
            .put(&mut wtxn, key, value.to_string().as_bytes())
            .map_err(txn_error)?;
        wtxn.commit().map_err(txn_error)?;
        Ok(true)
    }

    fn increment(&self, key: &str) -> StoreResult<i64> {
        let mut wtxn = self.env.write_txn().map_err(txn_error)?;
        let current = self
            .db
            .get(&wtxn, key)
            .map_err(txn_error)?
            .and_then(parse_raw_integer)
            .unwrap_or(0);
        let next = current.saturating_add(1);
        self.db
            .put(&mut wtxn, key, next.to_string().as_bytes())
            .map_err(txn_error)?;
        wtxn.commit().map_err(txn_error)?;
        Ok(next)
    }
}
