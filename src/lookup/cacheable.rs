//! Shared state and helpers for the two lookup orchestrators.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::planner;
use super::{EntryNameFn, FragmentHoursFn, LookupOptions, DEFAULT_CACHE_MARGINS};
use crate::errors::{ConfigError, LookupError};
use crate::range::TimeRange;
use crate::series::Series;
use crate::store::{default_entry_name, CacheEntry, CacheStore};
use crate::version::VersionTag;

/// Everything the versioned and retention orchestrators have in common: the
/// injected store, the key namespace, and the fragment planning knobs.
pub(crate) struct Cacheable {
    pub(crate) store: Box<dyn CacheStore>,
    pub(crate) prefix: String,
    pub(crate) cache_margins: f64,
    pub(crate) fragment_hours: FragmentHoursFn,
    pub(crate) entry_name: EntryNameFn,
    pub(crate) allowed_options: Vec<String>,
}

impl Cacheable {
    pub(crate) fn new(store: Box<dyn CacheStore>, prefix: String) -> Self {
        Self {
            store,
            prefix,
            cache_margins: DEFAULT_CACHE_MARGINS,
            fragment_hours: Box::new(|_| 1),
            entry_name: Box::new(default_entry_name),
            allowed_options: Vec::new(),
        }
    }

    /// Cache key for one fragment of `product`.
    pub(crate) fn entry_key(
        &self,
        product: &str,
        fragment: DateTime<Utc>,
        options: &LookupOptions,
    ) -> String {
        (self.entry_name)(&self.prefix, product, &fragment.to_rfc3339(), options)
    }

    /// Fragment duration and start list covering `range` with margins.
    pub(crate) fn plan(
        &self,
        product: &str,
        range: &TimeRange,
    ) -> Result<(Duration, Vec<DateTime<Utc>>), LookupError> {
        let fragment_hours = (self.fragment_hours)(product);
        if fragment_hours == 0 {
            return Err(ConfigError::invalid_fragment_hours(product).into());
        }
        let starts =
            planner::fragment_starts(&range.scale(self.cache_margins), fragment_hours)?;
        Ok((Duration::hours(i64::from(fragment_hours)), starts))
    }

    /// Slices a fetched series back into fragment-aligned pieces and stores
    /// each under its key, one write per fragment.
    pub(crate) async fn store_fragments(
        &self,
        product: &str,
        series: &Series,
        fragments: &[DateTime<Utc>],
        fragment_duration: Duration,
        version: Option<VersionTag>,
        options: &LookupOptions,
    ) -> Result<(), LookupError> {
        for &fragment in fragments {
            let key = self.entry_key(product, fragment, options);
            debug!(key = %key, "adding fragment to cache");
            let piece = series.slice_range(fragment, fragment + fragment_duration);
            self.store.set(&key, CacheEntry::new(piece, version)).await?;
        }
        Ok(())
    }
}

/// The fetch range covering one contiguous run of fragments.
pub(crate) fn run_range(
    run: &[DateTime<Utc>],
    fragment_duration: Duration,
) -> Result<TimeRange, LookupError> {
    match (run.first(), run.last()) {
        (Some(&first), Some(&last)) => TimeRange::new(first, last + fragment_duration),
        _ => Err(LookupError::invalid_range("empty fragment run")),
    }
}
