//! Retention-based lookup orchestration for unversioned products.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::cacheable::{run_range, Cacheable};
use super::{planner, LookupOptions, DEFAULT_RETENTION_DAYS};
use crate::errors::LookupError;
use crate::provider::{FetchRequest, SeriesProvider};
use crate::range::TimeRange;
use crate::series::{merge, Series};
use crate::spans;
use crate::store::{CacheEntry, CacheStats, CacheStore};
use crate::version::VersionTag;

/// Cached series lookup for products with no explicit version scheme.
///
/// Fragments are stamped with the wall-clock time of the fetch that produced
/// them. A fragment younger than the retention window is served as-is; an
/// older one is revalidated individually with a conditional fetch
/// (`if_newer_than` its stored tag). When the provider reports nothing
/// newer, the stored tag is bumped to now and the existing payload reused,
/// so an unchanged fragment is revalidated at most once per retention
/// window. New data replaces the fragment outright.
///
/// Missing fragments are batched into contiguous runs exactly like the
/// version-aware orchestrator.
pub struct RetentionSeriesCache<P> {
    provider: P,
    cacheable: Cacheable,
    retention: Duration,
}

impl<P: SeriesProvider> RetentionSeriesCache<P> {
    /// Creates an orchestrator with the given provider, store, and key
    /// prefix.
    ///
    /// Defaults: 1-hour fragments, margin factor 1.2, 14-day retention,
    /// default key naming, no pass-through options allowed.
    pub fn new(provider: P, store: Box<dyn CacheStore>, prefix: impl Into<String>) -> Self {
        Self {
            provider,
            cacheable: Cacheable::new(store, prefix.into()),
            retention: Duration::days(DEFAULT_RETENTION_DAYS),
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

    /// Sets the maximum age before a cached fragment must be revalidated.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
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

    /// Looks up `product` over `[start, stop)`, serving fresh fragments,
    /// revalidating stale ones, and fetching the rest.
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
        let span = spans::retention_lookup(product, &range);
        let _guard = span.enter();

        if options.disable_cache {
            debug!(product, "cache disabled, fetching directly");
            return Ok(self
                .provider
                .fetch(product, range, &FetchRequest::from_options(options))
                .await?);
        }

        let (fragment_duration, fragments) = self.cacheable.plan(product, &range)?;
        let now = Utc::now();

        let snapshot = self.cacheable.store.scoped_transaction().await?;
        let mut chunks: Vec<Option<Series>> = Vec::new();
        let mut missing: Vec<DateTime<Utc>> = Vec::new();
        let mut maybe_stale: Vec<(DateTime<Utc>, CacheEntry)> = Vec::new();
        for &fragment in &fragments {
            let key = self.cacheable.entry_key(product, fragment, options);
            match snapshot.get(&key).await? {
                None => missing.push(fragment),
                Some(entry) => match entry.version.and_then(|tag| tag.timestamp()) {
                    Some(fetched_at) if now - fetched_at < self.retention => {
                        chunks.push(Some(entry.payload));
                    }
                    Some(_) => {
                        debug!(key = %key, "cache entry may be stale");
                        maybe_stale.push((fragment, entry));
                    }
                    // Entries without a wall-clock tag never go stale
                    None => chunks.push(Some(entry.payload)),
                },
            }
        }
        drop(snapshot);

        info!(
            product,
            fragments = fragments.len(),
            missing = missing.len(),
            maybe_stale = maybe_stale.len(),
            store = self.cacheable.store.name(),
            "planned retention lookup"
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
                            Some(VersionTag::now()),
                            options,
                        )
                        .await?;
                    chunks.push(Some(series));
                }
                None => debug!(product, start = %fetch_range.start(), "run returned no data"),
            }
        }

        for (fragment, mut entry) in maybe_stale {
            let key = self.cacheable.entry_key(product, fragment, options);
            let span = spans::revalidate_fragment(product, fragment);
            let _guard = span.enter();

            let fetch_range = TimeRange::new(fragment, fragment + fragment_duration)?;
            let request = FetchRequest::from_options(options).with_if_newer_than(entry.version);
            match self.provider.fetch(product, fetch_range, &request).await? {
                None => {
                    // Nothing newer upstream: refresh the staleness clock and
                    // reuse the payload unchanged
                    debug!(key = %key, "revalidated fragment, bumping version");
                    entry.version = Some(VersionTag::now());
                    self.cacheable.store.set(&key, entry.clone()).await?;
                    chunks.push(Some(entry.payload));
                }
                Some(series) => {
                    debug!(key = %key, "revalidation returned new data");
                    self.cacheable
                        .store_fragments(
                            product,
                            &series,
                            &[fragment],
                            fragment_duration,
                            Some(VersionTag::now()),
                            options,
                        )
                        .await?;
                    chunks.push(Some(series));
                }
            }
        }

        if chunks.is_empty() {
            return Ok(None);
        }
        Ok(merge(chunks).map(|series| series.trim_to(&range)))
    }
}
