//! Cached lookup orchestration.
//!
//! Two orchestrators cover the two freshness policies providers come with:
//!
//! - [`SeriesCache`]: products publishing an explicit version; a cached
//!   fragment is valid while its version is at least the current one.
//! - [`RetentionSeriesCache`]: products without versions; fragments age out
//!   after a retention window and are revalidated conditionally.
//!
//! Both share the same fragment planning (rounding, enumeration, contiguous
//! run grouping) and the same merge-and-trim assembly.

mod cacheable;
mod options;
pub(crate) mod planner;
mod retention;
mod versioned;

pub use options::LookupOptions;
pub use retention::RetentionSeriesCache;
pub use versioned::SeriesCache;

use crate::version::VersionTag;

/// Per-product fragment granularity in hours.
pub type FragmentHoursFn = Box<dyn Fn(&str) -> u32 + Send + Sync>;

/// Per-product version lookup; `None` disables version comparison.
pub type VersionFn = Box<dyn Fn(&str) -> Option<VersionTag> + Send + Sync>;

/// Fragment key naming: `(prefix, product, fragment_start, options) -> key`.
pub type EntryNameFn = Box<dyn Fn(&str, &str, &str, &LookupOptions) -> String + Send + Sync>;

/// Default margin factor applied to requested ranges before rounding.
pub const DEFAULT_CACHE_MARGINS: f64 = 1.2;

/// Default retention window, in days, for unversioned products.
pub const DEFAULT_RETENTION_DAYS: i64 = 14;
