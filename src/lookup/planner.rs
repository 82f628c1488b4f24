//! Fragment planning: rounding requested ranges to fragment boundaries,
//! enumerating fragment start times, and grouping missing fragments into
//! contiguous fetch runs.

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::errors::LookupError;
use crate::range::TimeRange;

/// Hour bucket the instant falls into, rounded down.
pub(crate) fn lower_hour_bound(dt: DateTime<Utc>, fragment_hours: u32) -> u32 {
    (dt.hour() / fragment_hours) * fragment_hours
}

/// Hour bucket strictly covering the instant, rounded up.
///
/// Any sub-hour remainder bumps the hour before rounding, and the result is
/// at least one fragment, so a partial trailing fragment is always covered.
pub(crate) fn upper_hour_bound(dt: DateTime<Utc>, fragment_hours: u32) -> i64 {
    let has_subhour_remainder = dt.minute() != 0 || dt.second() != 0 || dt.nanosecond() != 0;
    let hours = dt.hour() + u32::from(has_subhour_remainder);
    i64::from(hours.div_ceil(fragment_hours).max(1) * fragment_hours)
}

/// Rounds a range outward to fragment boundaries.
///
/// The start rounds down within its day; the stop rounds up from its
/// midnight, so the rounded range always covers the input.
pub(crate) fn round_for_cache(
    range: &TimeRange,
    fragment_hours: u32,
) -> Result<TimeRange, LookupError> {
    let start = range.start();
    let rounded_start = start
        .date_naive()
        .and_hms_opt(lower_hour_bound(start, fragment_hours), 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            LookupError::timestamp(format!("cannot round {start} down to a fragment boundary"))
        })?;

    let stop = range.stop();
    let midnight = stop
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            LookupError::timestamp(format!("cannot round {stop} up to a fragment boundary"))
        })?;
    let rounded_stop = midnight + Duration::hours(upper_hour_bound(stop, fragment_hours));

    TimeRange::new(rounded_start, rounded_stop)
}

/// Fragment start times covering `range` after rounding, spaced exactly
/// `fragment_hours` apart, stop-exclusive.
///
/// Callers validate `fragment_hours >= 1` before planning.
pub(crate) fn fragment_starts(
    range: &TimeRange,
    fragment_hours: u32,
) -> Result<Vec<DateTime<Utc>>, LookupError> {
    let rounded = round_for_cache(range, fragment_hours)?;
    let step = Duration::hours(i64::from(fragment_hours));

    let mut starts = Vec::new();
    let mut tend = rounded.start();
    while tend < rounded.stop() {
        starts.push(tend);
        tend += step;
    }
    Ok(starts)
}

/// Groups fragment starts into maximal contiguous runs.
///
/// Two starts share a run when their gap is at most `1.01 ×
/// fragment_duration`; the tolerance absorbs rounding noise. One provider
/// fetch covers one run.
pub(crate) fn group_contiguous_runs(
    starts: &[DateTime<Utc>],
    fragment_duration: Duration,
) -> Vec<Vec<DateTime<Utc>>> {
    let tolerance = fragment_duration + fragment_duration / 100;
    let mut runs: Vec<Vec<DateTime<Utc>>> = Vec::new();

    for &start in starts {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|last| start - *last <= tolerance) => {
                run.push(start);
            }
            _ => runs.push(vec![start]),
        }
    }
    runs
}
