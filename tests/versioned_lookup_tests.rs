// SPDX-FileCopyrightText: 2026 seriescache contributors
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests of the version-aware lookup orchestrator: fragment
//! planning, snapshot reads, contiguous-run batching, write-back, and
//! merge-and-trim assembly.

mod helpers;

use helpers::{assert_dense_hourly, hourly_series, utc, MockProvider};
use seriescache::{
    CacheEntry, CacheStore, LookupError, LookupOptions, MemoryStore, SeriesCache, VersionTag,
};

fn day_cache(provider: MockProvider) -> SeriesCache<MockProvider> {
    SeriesCache::new(provider, Box::new(MemoryStore::new()), "test")
        .with_fragment_hours(|_| 24)
}

#[tokio::test]
async fn first_lookup_fetches_second_is_served_from_cache() {
    let provider = MockProvider::dense_hourly();
    let cache = day_cache(provider.clone());
    let options = LookupOptions::new();

    // Request inside one day with 24h fragments and the default 1.2 margin
    // rounds to exactly one full-day fragment
    let first = cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &options)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(provider.call_count(), 1);
    let call = &provider.calls()[0];
    assert_eq!(call.product, "mms1");
    assert_eq!(call.range.start(), utc(8, 0, 0));
    assert_eq!(call.range.stop(), utc(9, 0, 0));

    // Trimmed to the requested window: hours 1 through 9
    assert_dense_hourly(&first, utc(8, 1, 0), utc(8, 10, 0));

    // Identical repeat: zero further provider calls, identical output
    let second = cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &options)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(provider.call_count(), 1);
    assert_eq!(second, first);
}

#[tokio::test]
async fn contiguous_missing_fragments_fetch_in_one_run() {
    let provider = MockProvider::dense_hourly();
    let cache = day_cache(provider.clone()).with_cache_margins(1.0);

    let result = cache
        .lookup("mms1", utc(8, 0, 0), utc(10, 12, 0), &LookupOptions::new())
        .await
        .unwrap()
        .unwrap();

    // Three adjacent missing fragments, one provider call covering all of them
    assert_eq!(provider.call_count(), 1);
    let call = &provider.calls()[0];
    assert_eq!(call.range.start(), utc(8, 0, 0));
    assert_eq!(call.range.stop(), utc(11, 0, 0));

    assert_dense_hourly(&result, utc(8, 0, 0), utc(10, 12, 0));
}

#[tokio::test]
async fn cached_middle_fragment_splits_the_fetch_into_two_runs() {
    let provider = MockProvider::dense_hourly();
    let store = MemoryStore::new();

    // Pre-populate the middle day; no version tag means always fresh
    store
        .set(
            "test/mms1/2021-01-09T00:00:00+00:00",
            CacheEntry::new(hourly_series(utc(9, 0, 0), utc(10, 0, 0)), None),
        )
        .await
        .unwrap();

    let cache = SeriesCache::new(provider.clone(), Box::new(store), "test")
        .with_fragment_hours(|_| 24)
        .with_cache_margins(1.0);

    let result = cache
        .lookup("mms1", utc(8, 0, 0), utc(10, 12, 0), &LookupOptions::new())
        .await
        .unwrap()
        .unwrap();

    // The gap before and after the cached day fetch separately
    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].range.start(), utc(8, 0, 0));
    assert_eq!(calls[0].range.stop(), utc(9, 0, 0));
    assert_eq!(calls[1].range.start(), utc(10, 0, 0));
    assert_eq!(calls[1].range.stop(), utc(11, 0, 0));

    // Merged output is seamless: every hour exactly once
    assert_dense_hourly(&result, utc(8, 0, 0), utc(10, 12, 0));
}

#[tokio::test]
async fn outdated_fragment_is_refetched_and_overwritten() {
    let provider = MockProvider::dense_hourly();
    let store = MemoryStore::new();
    let store_handle = store.clone();

    let key = "test/mms1/2021-01-08T00:00:00+00:00";
    store
        .set(
            key,
            CacheEntry::new(
                hourly_series(utc(8, 0, 0), utc(9, 0, 0)),
                Some(VersionTag::Revision(1)),
            ),
        )
        .await
        .unwrap();

    let cache = SeriesCache::new(provider.clone(), Box::new(store), "test")
        .with_fragment_hours(|_| 24)
        .with_version_fn(|_| Some(VersionTag::Revision(2)));

    cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &LookupOptions::new())
        .await
        .unwrap()
        .unwrap();

    // The outdated entry looked like a miss and was re-fetched
    assert_eq!(provider.call_count(), 1);
    let stored = store_handle.get(key).await.unwrap().unwrap();
    assert_eq!(stored.version, Some(VersionTag::Revision(2)));
}

#[tokio::test]
async fn entry_at_or_above_required_version_is_served() {
    let provider = MockProvider::dense_hourly();
    let store = MemoryStore::new();

    store
        .set(
            "test/mms1/2021-01-08T00:00:00+00:00",
            CacheEntry::new(
                hourly_series(utc(8, 0, 0), utc(9, 0, 0)),
                Some(VersionTag::Revision(3)),
            ),
        )
        .await
        .unwrap();

    let cache = SeriesCache::new(provider.clone(), Box::new(store), "test")
        .with_fragment_hours(|_| 24)
        .with_version_fn(|_| Some(VersionTag::Revision(2)));

    let result = cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &LookupOptions::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(provider.call_count(), 0);
    assert_dense_hourly(&result, utc(8, 1, 0), utc(8, 10, 0));
}

#[tokio::test]
async fn empty_provider_response_is_no_data_not_error() {
    let provider = MockProvider::empty();
    let cache = day_cache(provider.clone());

    let result = cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &LookupOptions::new())
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn provider_failure_propagates_untouched() {
    let provider = MockProvider::failing("upstream service unavailable");
    let cache = day_cache(provider);

    let err = cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &LookupOptions::new())
        .await
        .unwrap_err();

    match err {
        LookupError::Provider(e) => {
            assert!(e.to_string().contains("upstream service unavailable"));
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn disable_cache_bypasses_store_entirely() {
    let provider = MockProvider::dense_hourly();
    let store = MemoryStore::new();

    // A fresh cached fragment that would normally satisfy the request
    store
        .set(
            "test/mms1/2021-01-08T00:00:00+00:00",
            CacheEntry::new(hourly_series(utc(8, 0, 0), utc(9, 0, 0)), None),
        )
        .await
        .unwrap();

    let cache = SeriesCache::new(provider.clone(), Box::new(store), "test")
        .with_fragment_hours(|_| 24);

    let options = LookupOptions::new().with_disable_cache(true);
    cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &options)
        .await
        .unwrap()
        .unwrap();

    // Provider was called with the original, unrounded window
    assert_eq!(provider.call_count(), 1);
    let call = &provider.calls()[0];
    assert_eq!(call.range.start(), utc(8, 1, 0));
    assert_eq!(call.range.stop(), utc(8, 10, 0));
}

#[tokio::test]
async fn unknown_option_is_rejected_before_any_fetch() {
    let provider = MockProvider::dense_hourly();
    let cache = day_cache(provider.clone())
        .with_allowed_options(["coordinate_system"]);

    let options = LookupOptions::new().with_extra("coordinate_systme", "gse");
    let err = cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &options)
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::Config(_)));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn whitelisted_options_are_forwarded_to_the_provider() {
    let provider = MockProvider::dense_hourly();
    let cache = day_cache(provider.clone())
        .with_allowed_options(["coordinate_system"]);

    let options = LookupOptions::new().with_extra("coordinate_system", "gse");
    cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &options)
        .await
        .unwrap();

    let call = &provider.calls()[0];
    assert_eq!(
        call.extra.get("coordinate_system").map(String::as_str),
        Some("gse")
    );
}

#[tokio::test]
async fn custom_entry_name_partitions_the_cache_by_option() {
    let provider = MockProvider::dense_hourly();
    let cache = day_cache(provider.clone())
        .with_allowed_options(["coordinate_system"])
        .with_entry_name(|prefix, product, start, options| {
            let system = options
                .extra
                .get("coordinate_system")
                .map(String::as_str)
                .unwrap_or("gse");
            format!("{prefix}/{product}/{system}/{start}")
        });

    let gse = LookupOptions::new().with_extra("coordinate_system", "gse");
    let gsm = LookupOptions::new().with_extra("coordinate_system", "gsm");

    cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &gse)
        .await
        .unwrap();
    cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &gsm)
        .await
        .unwrap();
    // Same window, different coordinate system: separate cache entries
    assert_eq!(provider.call_count(), 2);

    cache
        .lookup("mms1", utc(8, 1, 0), utc(8, 10, 0), &gse)
        .await
        .unwrap();
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let cache = day_cache(MockProvider::dense_hourly());
    let err = cache
        .lookup("mms1", utc(8, 10, 0), utc(8, 1, 0), &LookupOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::InvalidRange { .. }));
}

#[tokio::test]
async fn store_stats_reflect_lookup_traffic() {
    let provider = MockProvider::dense_hourly();
    let cache = day_cache(provider).with_cache_margins(1.0);
    let options = LookupOptions::new();

    cache
        .lookup("mms1", utc(8, 0, 0), utc(8, 12, 0), &options)
        .await
        .unwrap();
    cache
        .lookup("mms1", utc(8, 0, 0), utc(8, 12, 0), &options)
        .await
        .unwrap();

    let stats = cache.store_stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}
