//! lexicache storage - cache stores and the caching translator
//!
//! Store backends (in-memory and LMDB), the invalidation epoch, and the
//! read-through decorator that ties them to a [`lexicache_core::Translator`].

pub mod cache;

// Re-export cache types for callers wiring up a translator
pub use cache::{
    CacheStats, CacheStore, CachedOutcome, CachedTranslator, Clock, EpochSnapshot, Fingerprint,
    LmdbStore, LmdbStoreError, ManualClock, MemoryStore, SystemClock, VersionManager,
};
