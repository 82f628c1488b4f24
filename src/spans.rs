//! Span creation helpers for seriescache operations.
//!
//! Observability is kept in one place rather than scattered through the
//! orchestrators.
//!
//! Telemetry is kept orthogonal to business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here, entered
//! with a guard at the top of the operation:
//!
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     let span = spans::my_operation(param_value);
//!     let _guard = span.enter();
//!     // Business logic here
//! }
//! ```

use chrono::{DateTime, Utc};
use tracing::Span;

use crate::range::TimeRange;

/// Create span for a version-aware cached lookup.
///
/// Parent: None (root span for this operation)
/// Children: fetch_run spans (one per missing run)
#[inline]
pub(crate) fn lookup(product: &str, range: &TimeRange) -> Span {
    tracing::info_span!(
        "seriescache.lookup",
        product = product,
        start = %range.start(),
        stop = %range.stop(),
    )
}

/// Create span for a retention-based cached lookup.
///
/// Parent: None (root span for this operation)
/// Children: fetch_run and revalidate_fragment spans
#[inline]
pub(crate) fn retention_lookup(product: &str, range: &TimeRange) -> Span {
    tracing::info_span!(
        "seriescache.retention_lookup",
        product = product,
        start = %range.start(),
        stop = %range.stop(),
    )
}

/// Create span for one provider fetch over a contiguous run of missing
/// fragments.
///
/// Parent: lookup or retention_lookup span
/// Children: provider-side spans, if the provider emits any
#[inline]
pub(crate) fn fetch_run(product: &str, range: &TimeRange, fragments: usize) -> Span {
    tracing::debug_span!(
        "seriescache.fetch_run",
        product = product,
        start = %range.start(),
        stop = %range.stop(),
        fragments = fragments,
    )
}

/// Create span for the conditional revalidation of one maybe-stale fragment.
///
/// Parent: retention_lookup span
/// Children: provider-side spans, if the provider emits any
#[inline]
pub(crate) fn revalidate_fragment(product: &str, fragment: DateTime<Utc>) -> Span {
    tracing::debug_span!(
        "seriescache.revalidate_fragment",
        product = product,
        fragment = %fragment,
    )
}
