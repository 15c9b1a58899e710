//! Invalidation epoch for the translation cache.
//!
//! Every fingerprint embeds the current epoch. Bumping the epoch in the store
//! makes every previously computed fingerprint unreachable, which invalidates
//! the whole cache without deleting a single entry.
//!
//! Each process keeps a local copy of the epoch and trusts it for
//! `version_ttl`. An invalidation issued anywhere becomes visible to a given
//! process at most that long after it happened.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use lexicache_core::{CacheConfig, StoreError, StoreResult};
use tracing::{debug, info, warn};

use super::clock::{elapsed_since, Clock, SystemClock};
use super::traits::{parse_raw_integer, CacheStore};

/// A locally cached epoch and when it was read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochSnapshot {
    pub epoch: i64,
    pub refreshed_at: DateTime<Utc>,
}

impl EpochSnapshot {
    /// True once the snapshot is at least `ttl` old.
    ///
    /// A zero `ttl` therefore re-reads on every call.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        elapsed_since(now, self.refreshed_at) >= ttl
    }
}

/// Owner of the global invalidation epoch.
///
/// Share one instance through `Arc` when several decorators must agree on
/// the epoch they see.
pub struct VersionManager<S: CacheStore + ?Sized> {
    store: Arc<S>,
    version_key: String,
    version_ttl: Duration,
    clock: Arc<dyn Clock>,
    snapshot: RwLock<Option<EpochSnapshot>>,
}

impl<S: CacheStore + ?Sized> VersionManager<S> {
    /// Create a version manager using wall-clock time.
    pub fn new(store: Arc<S>, config: &CacheConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create a version manager with an explicit time source.
    pub fn with_clock(store: Arc<S>, config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            version_key: config.version_key.clone(),
            version_ttl: config.version_ttl,
            clock,
            snapshot: RwLock::new(None),
        }
    }

    /// Store key of the epoch counter.
    pub fn version_key(&self) -> &str {
        &self.version_key
    }

    /// Staleness bound of the local snapshot.
    pub fn version_ttl(&self) -> Duration {
        self.version_ttl
    }

    /// The current invalidation epoch.
    ///
    /// Served from the local snapshot while it is fresh. Otherwise the epoch
    /// key is initialized if missing, the snapshot is dropped, and the epoch
    /// is read back from the store: one add-if-missing and one read.
    pub fn current_epoch(&self) -> StoreResult<i64> {
        let now = self.clock.now();
        if let Some(snapshot) = self.snapshot()? {
            if !snapshot.is_stale(now, self.version_ttl) {
                return Ok(snapshot.epoch);
            }
        }

        self.ensure_initialized()?;
        self.force_refresh()?;

        let epoch = self.read_epoch()?;
        let mut slot = self.snapshot.write().map_err(|_| StoreError::LockPoisoned)?;
        *slot = Some(EpochSnapshot {
            epoch,
            refreshed_at: self.clock.now(),
        });
        debug!(epoch, key = %self.version_key, "translation cache epoch refreshed");
        Ok(epoch)
    }

    /// Bump the stored epoch by one and return the new value.
    ///
    /// The local snapshot is left alone: this process, like every other,
    /// picks the new epoch up on its next refresh.
    pub fn invalidate(&self) -> StoreResult<i64> {
        let epoch = self.store.increment(&self.version_key)?;
        info!(epoch, key = %self.version_key, "translation cache invalidated");
        Ok(epoch)
    }

    /// Write epoch 0 if the store has no epoch yet. Idempotent.
    pub fn ensure_initialized(&self) -> StoreResult<()> {
        if self.store.write_raw_if_absent(&self.version_key, 0)? {
            debug!(key = %self.version_key, "translation cache epoch initialized");
        }
        Ok(())
    }

    /// Drop the local snapshot so the next `current_epoch` re-reads.
    pub fn force_refresh(&self) -> StoreResult<()> {
        let mut slot = self.snapshot.write().map_err(|_| StoreError::LockPoisoned)?;
        *slot = None;
        Ok(())
    }

    /// The locally cached epoch, without touching the store.
    pub fn cached_epoch(&self) -> StoreResult<Option<i64>> {
        Ok(self.snapshot()?.map(|s| s.epoch))
    }

    fn snapshot(&self) -> StoreResult<Option<EpochSnapshot>> {
        let slot = self.snapshot.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(*slot)
    }

    /// Absent and malformed values both read as epoch 0.
    fn read_epoch(&self) -> StoreResult<i64> {
        match self.store.read_raw(&self.version_key)? {
            None => Ok(0),
            Some(bytes) => match parse_raw_integer(&bytes) {
                Some(epoch) => Ok(epoch),
                None => {
                    warn!(
                        key = %self.version_key,
                        raw = %String::from_utf8_lossy(&bytes),
                        "malformed translation cache epoch, using 0"
                    );
                    Ok(0)
                }
            },
        }
    }
}
