//! Time intervals for series requests and fragment planning.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::LookupError;

/// A half-open time interval `[start, stop)`.
///
/// Invariant: `start <= stop`, enforced by [`TimeRange::new`]. All instants
/// are UTC; providers and the cache never see local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new range, rejecting `start > stop`.
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Result<Self, LookupError> {
        if start > stop {
            return Err(LookupError::invalid_range(format!(
                "start {start} is after stop {stop}"
            )));
        }
        Ok(Self { start, stop })
    }

    /// Start of the range (inclusive).
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Stop of the range (exclusive).
    pub fn stop(&self) -> DateTime<Utc> {
        self.stop
    }

    /// Length of the range.
    pub fn duration(&self) -> Duration {
        self.stop - self.start
    }

    /// Whether `instant` falls inside `[start, stop)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.stop
    }

    /// Intersection with another range, or `None` when they are disjoint.
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let stop = self.stop.min(other.stop);
        if start < stop {
            Some(TimeRange { start, stop })
        } else {
            None
        }
    }

    /// Expands the range around its center by `factor`.
    ///
    /// A factor of 1.2 pads both edges with 10% of the duration, which is how
    /// the cache pre-fetches margin context around a requested window. The
    /// center stays fixed; factors below 1 shrink the range symmetrically.
    pub fn scale(&self, factor: f64) -> TimeRange {
        let span_ns = self.duration().num_nanoseconds().unwrap_or(i64::MAX) as f64;
        let pad_ns = ((factor - 1.0) * span_ns / 2.0) as i64;
        let pad = Duration::nanoseconds(pad_ns);
        TimeRange {
            start: self.start - pad,
            stop: self.stop + pad,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.stop.to_rfc3339())
    }
}
