//! Version-aware lookup orchestration.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::cacheable::{run_range, Cacheable};
use super::{planner, LookupOptions, VersionFn};
use crate::errors::LookupError;
use crate::provider::{FetchRequest, SeriesProvider};
use crate::range::TimeRange;
use crate::series::{merge, Series};
use crate::spans;
use crate::store::{CacheStats, CacheStore};
use crate::version::VersionTag;

/// Cached series lookup for products with an explicit version scheme.
///
/// The orchestrator rounds a requested range to fragment boundaries, reads
/// every fragment from one store snapshot, fetches maximal contiguous runs
/// of missing fragments from the provider (one call per run), writes the
/// fetched fragments back, and merges everything into one series trimmed to
/// the requested window. A cached fragment is served as-is when its version
/// is at least the product's current version; outdated fragments are
/// re-fetched and overwritten in place.
///
/// All collaborators are injected at construction; there is no implicit
/// process-wide store.
///
/// # Examples
///
/// ```rust,ignore
/// use seriescache::{LookupOptions, MemoryStore, SeriesCache, VersionTag};
///
/// let cache = SeriesCache::new(provider, Box::new(MemoryStore::new()), "orbits")
///     .with_fragment_hours(|_| 24)
///     .with_version_fn(|_| Some(VersionTag::Revision(2)));
///
/// let series = cache
///     .lookup("mms1", start, stop, &LookupOptions::new())
///     .await?;
/// ```
pub struct SeriesCache<P> {
    provider: P,
    cacheable: Cacheable,
    version_fn: VersionFn,
}

impl<P: SeriesProvider> SeriesCache<P> {
    /// Creates an orchestrator with the given provider, store, and key
    /// prefix.
    ///
    /// Defaults: 1-hour fragments, margin factor 1.2, no version function
    /// (every cached fragment counts as fresh), default key naming, no
    /// pass-through options allowed.
    pub fn new(provider: P, store: Box<dyn CacheStore>, prefix: impl Into<String>) -> Self {
        Self {
            provider,
            cacheable: Cacheable::new(store, prefix.into()),
            version_fn: Box::new(|_| None),
        }
    }

    /// Sets the per-product fragment granularity in hours.
    pub fn with_fragment_hours(
        mut self,
        fragment_hours: impl Fn(&str) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.cacheable.fragment_hours = Box::new(fragment_hours);
        self
    }

    /// Sets the margin factor applied to requested ranges before rounding.
    pub fn with_cache_margins(mut self, cache_margins: f64) -> Self {
        self.cacheable.cache_margins = cache_margins;
        self
    }

    /// Sets the per-product version function.
    pub fn with_version_fn(
        mut self,
        version_fn: impl Fn(&str) -> Option<VersionTag> + Send + Sync + 'static,
    ) -> Self {
        self.version_fn = Box::new(version_fn);
        self
    }

    /// Sets a custom fragment key naming function.
    pub fn with_entry_name(
        mut self,
        entry_name: impl Fn(&str, &str, &str, &LookupOptions) -> String + Send + Sync + 'static,
    ) -> Self {
        self.cacheable.entry_name = Box::new(entry_name);
        self
    }

    /// Sets the whitelist of accepted pass-through option keys.
    pub fn with_allowed_options(
        mut self,
        allowed: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.cacheable.allowed_options = allowed.into_iter().map(Into::into).collect();
        self
    }

    /// Current statistics of the injected store.
    pub async fn store_stats(&self) -> CacheStats {
        self.cacheable.store.stats().await
    }

    /// Looks up `product` over `[start, stop)`, serving cached fragments and
    /// fetching the rest.
    ///
    /// Returns `Ok(None)` when neither the cache nor the provider has any
    /// data for the range. Provider failures propagate untouched.
    pub async fn lookup(
        &self,
        product: &str,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        options: &LookupOptions,
    ) -> Result<Option<Series>, LookupError> {
        options.validate_extra(&self.cacheable.allowed_options)?;
        let range = TimeRange::new(start, stop)?;
        let span = spans::lookup(product, &range);
        let _guard = span.enter();

        if options.disable_cache {
            debug!(product, "cache disabled, fetching directly");
            return Ok(self
                .provider
                .fetch(product, range, &FetchRequest::from_options(options))
                .await?);
        }

        let version = (self.version_fn)(product);
        let (fragment_duration, fragments) = self.cacheable.plan(product, &range)?;

        let snapshot = self.cacheable.store.scoped_transaction().await?;
        let mut chunks: Vec<Option<Series>> = Vec::new();
        let mut missing: Vec<DateTime<Utc>> = Vec::new();
        for &fragment in &fragments {
            let key = self.cacheable.entry_key(product, fragment, options);
            match snapshot.get(&key).await? {
                Some(entry) if entry.is_up_to_date(version.as_ref()) => {
                    chunks.push(Some(entry.payload));
                }
                Some(_) => {
                    debug!(key = %key, "cache entry is outdated");
                    missing.push(fragment);
                }
                None => missing.push(fragment),
            }
        }
        drop(snapshot);

        info!(
            product,
            fragments = fragments.len(),
            missing = missing.len(),
            store = self.cacheable.store.name(),
            "planned cached lookup"
        );

        for run in planner::group_contiguous_runs(&missing, fragment_duration) {
            let fetch_range = run_range(&run, fragment_duration)?;
            let span = spans::fetch_run(product, &fetch_range, run.len());
            let _guard = span.enter();

            let fetched = self
                .provider
                .fetch(product, fetch_range, &FetchRequest::from_options(options))
                .await?;
            match fetched {
                Some(series) => {
                    self.cacheable
                        .store_fragments(
                            product,
                            &series,
                            &run,
                            fragment_duration,
                            version,
                            options,
                        )
                        .await?;
                    chunks.push(Some(series));
                }
                // No data for this run is a gap, not an error
                None => debug!(product, start = %fetch_range.start(), "run returned no data"),
            }
        }

        if chunks.is_empty() {
            return Ok(None);
        }
        Ok(merge(chunks).map(|series| series.trim_to(&range)))
    }
}
