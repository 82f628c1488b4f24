//! Fragment-aligned local caching for time-ranged measurement series.
//!
//! Remote providers serve scientific measurement series over arbitrary time
//! ranges; re-asking them for data they already returned is the dominant
//! cost of interactive analysis. This crate persists fixed-size,
//! time-aligned *fragments* of each product in a local [`CacheStore`] and
//! orchestrates lookups so that only genuinely missing fragments reach the
//! provider, batched into maximal contiguous runs. Cached and fresh
//! fragments are merged into one gap-free, duplicate-free [`Series`] trimmed
//! to the requested window.
//!
//! Two orchestrators cover the two freshness policies in the wild:
//! [`SeriesCache`] compares explicit provider-published versions, and
//! [`RetentionSeriesCache`] ages unversioned fragments out of a retention
//! window and revalidates them conditionally.
//!
//! ```rust,ignore
//! use seriescache::{LookupOptions, MemoryStore, SeriesCache, VersionTag};
//!
//! let cache = SeriesCache::new(provider, Box::new(MemoryStore::new()), "orbits")
//!     .with_fragment_hours(|_| 24)
//!     .with_version_fn(|product| Some(VersionTag::Revision(2)));
//!
//! let series = cache.lookup("mms1", start, stop, &LookupOptions::new()).await?;
//! ```

pub mod errors;
mod lookup;
mod provider;
mod range;
mod series;
mod spans;
mod store;
mod version;

pub use errors::{
    ConfigError, LookupError, ProviderError, SeriesCacheError, SeriesError, StoreError,
};
pub use lookup::{
    EntryNameFn, FragmentHoursFn, LookupOptions, RetentionSeriesCache, SeriesCache, VersionFn,
    DEFAULT_CACHE_MARGINS, DEFAULT_RETENTION_DAYS,
};
pub use provider::{FetchRequest, SeriesProvider};
pub use range::TimeRange;
pub use series::{merge, SecondaryAxis, Series};
pub use store::types::{AccessSequence, TimestampMillis};
pub use store::{
    default_entry_name, CacheEntry, CacheStats, CacheStore, DiskStore, MemoryStore, NoOpStore,
    StoreSnapshot,
};
pub use version::VersionTag;
