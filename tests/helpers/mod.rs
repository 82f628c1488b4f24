// SPDX-FileCopyrightText: 2026 seriescache contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for seriescache integration tests
//!
//! Provides a scripted mock provider with call recording, so orchestrator
//! behavior can be asserted without real network collaborators.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Timelike, Utc};
use std::sync::{Arc, Mutex};

use seriescache::{FetchRequest, ProviderError, Series, SeriesProvider, TimeRange, VersionTag};

/// One recorded provider invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub product: String,
    pub range: TimeRange,
    pub if_newer_than: Option<VersionTag>,
    pub extra: std::collections::BTreeMap<String, String>,
}

type ResponseFn =
    Box<dyn Fn(&str, TimeRange, &FetchRequest) -> Result<Option<Series>, ProviderError> + Send + Sync>;

/// Mock SeriesProvider for testing orchestrator logic
///
/// Records every call it receives and answers with a scripted response.
///
/// # Example
///
/// ```rust,ignore
/// let provider = MockProvider::dense_hourly();
/// let cache = SeriesCache::new(provider.clone(), Box::new(MemoryStore::new()), "test");
/// // ... run lookups ...
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Clone)]
pub struct MockProvider {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    respond: Arc<ResponseFn>,
}

impl MockProvider {
    /// A provider answering every request with a dense hourly series.
    pub fn dense_hourly() -> Self {
        Self::with_response(|_, range, _| Ok(Some(hourly_series(range.start(), range.stop()))))
    }

    /// A provider that has no data for anything.
    pub fn empty() -> Self {
        Self::with_response(|_, _, _| Ok(None))
    }

    /// A provider that fails every request.
    pub fn failing(message: &'static str) -> Self {
        Self::with_response(move |_, _, _| Err(ProviderError::message(message)))
    }

    /// A provider answering dense hourly data, except that conditional
    /// revalidation requests report "nothing newer".
    pub fn dense_unless_revalidating() -> Self {
        Self::with_response(|_, range, request| {
            if request.if_newer_than.is_some() {
                Ok(None)
            } else {
                Ok(Some(hourly_series(range.start(), range.stop())))
            }
        })
    }

    /// A provider with a custom scripted response.
    pub fn with_response(
        respond: impl Fn(&str, TimeRange, &FetchRequest) -> Result<Option<Series>, ProviderError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            respond: Arc::new(Box::new(respond)),
        }
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SeriesProvider for MockProvider {
    async fn fetch(
        &self,
        product: &str,
        range: TimeRange,
        request: &FetchRequest,
    ) -> Result<Option<Series>, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            product: product.to_string(),
            range,
            if_newer_than: request.if_newer_than,
            extra: request.extra.clone(),
        });
        (self.respond)(product, range, request)
    }
}

/// UTC instant in January 2021, the month all tests play in.
pub fn utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, day, hour, minute, 0).unwrap()
}

/// Hours elapsed since 2021-01-01T00:00 for `instant`; the value every mock
/// sample carries, so merged output can be checked against its timestamps.
pub fn hour_index(instant: DateTime<Utc>) -> f64 {
    (instant - utc(1, 0, 0)).num_hours() as f64
}

/// A dense series with one sample per whole hour in `[start, stop)`.
pub fn hourly_series(start: DateTime<Utc>, stop: DateTime<Utc>) -> Series {
    let mut t = if start.minute() == 0 && start.second() == 0 && start.nanosecond() == 0 {
        start
    } else {
        start
            .date_naive()
            .and_hms_opt(start.hour(), 0, 0)
            .unwrap()
            .and_utc()
            + chrono::Duration::hours(1)
    };

    let mut time = Vec::new();
    let mut values = Vec::new();
    while t < stop {
        time.push(t);
        values.push(vec![hour_index(t)]);
        t += chrono::Duration::hours(1);
    }

    Series::new(time, values)
        .unwrap()
        .with_columns(vec!["b_total".to_string()])
        .with_unit("nT")
}

/// Asserts a series is exactly the dense hourly samples of `[start, stop)`.
pub fn assert_dense_hourly(series: &Series, start: DateTime<Utc>, stop: DateTime<Utc>) {
    let expected = hourly_series(start, stop);
    assert_eq!(series.time(), expected.time(), "timestamps differ");
    assert_eq!(series.values(), expected.values(), "values differ");
}
