//! Versioned read-through cache for translation lookups.
//!
//! [`CachedTranslator`] decorates any [`Translator`](lexicache_core::Translator)
//! with a key-value [`CacheStore`]. Each lookup is keyed by a [`Fingerprint`]
//! combining the locale, the key, the options and the current invalidation
//! epoch owned by [`VersionManager`].
//!
//! # Invalidation
//!
//! Nothing is ever deleted. Invalidation bumps the stored epoch, and every
//! process adopts the new epoch once its local snapshot is older than
//! `version_ttl`. Old entries become unreachable.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(LmdbStore::open("/var/cache/lexicache", 64)?);
//! let cached = CachedTranslator::new(backend, store, CacheConfig::from_env()?);
//!
//! match cached.translate(&"en".into(), &"greeting".into(), &TranslateOptions::new()) {
//!     Ok(value) => render(value),
//!     Err(e) if e.is_missing() => render_fallback(),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

pub mod clock;
pub mod fingerprint;
pub mod lmdb_backend;
pub mod memory;
pub mod read_through;
pub mod traits;
pub mod version;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fingerprint::Fingerprint;
pub use lmdb_backend::{LmdbStore, LmdbStoreError};
pub use memory::MemoryStore;
pub use read_through::{CachedOutcome, CachedTranslator};
pub use traits::{parse_raw_integer, CacheStats, CacheStore};
pub use version::{EpochSnapshot, VersionManager};
