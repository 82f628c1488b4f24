//! Cache store backends for series fragments.
//!
//! The orchestrators talk to storage through the [`CacheStore`] trait and
//! never see a concrete backend:
//!
//! - [`MemoryStore`]: in-memory map with optional TTL and LRU size limits
//! - [`DiskStore`]: persistent JSON file with atomic saves
//! - [`NoOpStore`]: disables caching entirely
//!
//! A lookup reads all of its fragment keys from one [`StoreSnapshot`]
//! obtained via [`CacheStore::scoped_transaction`], so a concurrent writer
//! cannot make the fragments of a single lookup disagree with each other.
//! Writes happen after the snapshot, one fragment at a time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::StoreError;
use crate::series::Series;
use crate::version::VersionTag;

mod disk;
mod memory;
mod noop;
pub mod types;

pub use disk::DiskStore;
pub use memory::MemoryStore;
pub use noop::NoOpStore;

/// A stored fragment: its payload and the freshness marker it was written
/// with.
///
/// Entries are overwritten in place when a fragment is re-fetched and are
/// never deleted by the orchestrators; eviction belongs to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached series fragment.
    pub payload: Series,
    /// Freshness marker; `None` means the entry is always considered fresh.
    pub version: Option<VersionTag>,
}

impl CacheEntry {
    /// Creates an entry for `payload` at `version`.
    pub fn new(payload: Series, version: Option<VersionTag>) -> Self {
        Self { payload, version }
    }

    /// Whether this entry satisfies `required`.
    ///
    /// An entry without a version and a requirement of `None` are both
    /// unconditionally satisfied; otherwise the entry's version must be at
    /// least the required one.
    pub fn is_up_to_date(&self, required: Option<&VersionTag>) -> bool {
        match (&self.version, required) {
            (None, _) | (_, None) => true,
            (Some(have), Some(want)) => have >= want,
        }
    }
}

/// Statistics about store performance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of hits (successful retrievals)
    pub hits: u64,
    /// Number of misses (key not found)
    pub misses: u64,
    /// Number of entries evicted due to size limits
    pub evictions: u64,
    /// Number of entries expired due to TTL
    pub expirations: u64,
    /// Current number of entries in the store
    pub entries: usize,
}

impl CacheStats {
    /// The hit rate as a percentage (0.0 to 100.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, evictions={}, expirations={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.evictions,
            self.expirations,
            self.entries,
            self.hit_rate()
        )
    }
}

/// A consistent multi-key read view over a store.
///
/// All reads from one snapshot observe the store as it was when the snapshot
/// was taken, regardless of concurrent writes.
#[async_trait]
pub trait StoreSnapshot: Send + Sync {
    /// Retrieves an entry from the snapshot.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;
}

/// Key → entry persistence collaborator for series fragments.
///
/// Implementations must be thread-safe; use interior mutability as needed.
/// Expiry and eviction are backend concerns and look like misses to callers.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Retrieves an entry, `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Inserts or overwrites an entry.
    async fn set(&self, key: &str, entry: CacheEntry) -> Result<(), StoreError>;

    /// Whether a live (non-expired) entry exists for `key`.
    async fn contains(&self, key: &str) -> Result<bool, StoreError>;

    /// Opens a consistent read snapshot covering all keys.
    async fn scoped_transaction(&self) -> Result<Box<dyn StoreSnapshot>, StoreError>;

    /// Current store statistics.
    async fn stats(&self) -> CacheStats;

    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;
}

/// Default fragment key format: `"{prefix}/{product}/{fragment_start}"`.
///
/// Orchestrators accept a custom key function when pass-through options must
/// become part of the key (a coordinate system, for example).
pub fn default_entry_name(
    prefix: &str,
    product: &str,
    fragment_start: &str,
    _options: &crate::lookup::LookupOptions,
) -> String {
    format!("{prefix}/{product}/{fragment_start}")
}
