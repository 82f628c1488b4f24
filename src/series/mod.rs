//! The time-indexed data structure produced by providers and merged by the
//! cache.
//!
//! A [`Series`] holds a monotonically non-decreasing time vector, a
//! row-aligned value matrix, and the descriptive payload a provider attaches
//! to it: metadata, column labels, a physical unit tag, and an optional
//! secondary axis for two-dimensional products (e.g. energy bins of a
//! spectrogram). Fragments stored in the cache and the merged result handed
//! to callers are all `Series` values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

use crate::errors::SeriesError;
use crate::range::TimeRange;

mod merge;

pub use merge::merge;

/// Secondary axis of a two-dimensional series.
///
/// `PerRow` axes vary sample by sample (one axis row per value row) and are
/// sliced and merged together with the values. `Fixed` axes describe bin
/// centers shared by every sample and travel with the series unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SecondaryAxis {
    /// Row-aligned axis, same row count as the value matrix.
    PerRow(Vec<Vec<f64>>),
    /// One axis vector shared by all rows.
    Fixed(Vec<f64>),
}

/// An ordered sequence of timestamped measurement rows.
///
/// Invariants, enforced at construction:
/// - `time.len() == values.len()`
/// - every value row has the same width
/// - a `PerRow` secondary axis has exactly one row per value row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    time: Vec<DateTime<Utc>>,
    values: Vec<Vec<f64>>,
    meta: BTreeMap<String, String>,
    columns: Vec<String>,
    unit: Option<String>,
    axis: Option<SecondaryAxis>,
}

impl Series {
    /// Creates a series from a time vector and a row-aligned value matrix.
    pub fn new(time: Vec<DateTime<Utc>>, values: Vec<Vec<f64>>) -> Result<Self, SeriesError> {
        if time.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                time_len: time.len(),
                rows: values.len(),
            });
        }
        if let Some(first) = values.first() {
            let expected = first.len();
            for (row, data) in values.iter().enumerate() {
                if data.len() != expected {
                    return Err(SeriesError::RaggedRows {
                        row,
                        width: data.len(),
                        expected,
                    });
                }
            }
        }
        Ok(Self {
            time,
            values,
            meta: BTreeMap::new(),
            columns: Vec::new(),
            unit: None,
            axis: None,
        })
    }

    /// An empty series with no rows and no descriptive payload.
    pub fn empty() -> Self {
        Self {
            time: Vec::new(),
            values: Vec::new(),
            meta: BTreeMap::new(),
            columns: Vec::new(),
            unit: None,
            axis: None,
        }
    }

    /// An empty series carrying `other`'s columns, metadata, unit, and axis
    /// shape, for type-stable "no data" results.
    ///
    /// A `PerRow` axis becomes an empty `PerRow` axis so the row alignment
    /// invariant holds; a `Fixed` axis is copied as-is.
    pub fn shaped_like(other: &Series) -> Self {
        Self {
            time: Vec::new(),
            values: Vec::new(),
            meta: other.meta.clone(),
            columns: other.columns.clone(),
            unit: other.unit.clone(),
            axis: other.axis.as_ref().map(|axis| match axis {
                SecondaryAxis::PerRow(_) => SecondaryAxis::PerRow(Vec::new()),
                SecondaryAxis::Fixed(bins) => SecondaryAxis::Fixed(bins.clone()),
            }),
        }
    }

    /// Attaches metadata.
    pub fn with_meta(mut self, meta: BTreeMap<String, String>) -> Self {
        self.meta = meta;
        self
    }

    /// Attaches column labels.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Attaches a physical unit tag.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Attaches a secondary axis, validating row alignment for `PerRow`.
    pub fn with_axis(mut self, axis: SecondaryAxis) -> Result<Self, SeriesError> {
        if let SecondaryAxis::PerRow(rows) = &axis {
            if rows.len() != self.values.len() {
                return Err(SeriesError::AxisShapeMismatch {
                    rows: self.values.len(),
                    axis_rows: rows.len(),
                });
            }
        }
        self.axis = Some(axis);
        Ok(self)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Timestamp of the first row.
    pub fn first_time(&self) -> Option<DateTime<Utc>> {
        self.time.first().copied()
    }

    /// Timestamp of the last row.
    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.time.last().copied()
    }

    /// Time vector.
    pub fn time(&self) -> &[DateTime<Utc>] {
        &self.time
    }

    /// Value matrix, one row per timestamp.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Metadata mapping.
    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    /// Column labels.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Physical unit tag.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Secondary axis.
    pub fn axis(&self) -> Option<&SecondaryAxis> {
        self.axis.as_ref()
    }

    /// Index of the first row with timestamp `>= instant`.
    ///
    /// Equals `len()` when every row is earlier than `instant`.
    pub fn index_at_or_after(&self, instant: DateTime<Utc>) -> usize {
        self.time.partition_point(|t| *t < instant)
    }

    /// Copy of the rows in `rows`, keeping the descriptive payload.
    ///
    /// A `PerRow` axis is sliced alongside the values; a `Fixed` axis is
    /// carried unchanged.
    pub fn slice_rows(&self, rows: Range<usize>) -> Series {
        let end = rows.end.min(self.len());
        let rows = rows.start.min(end)..end;
        Series {
            time: self.time[rows.clone()].to_vec(),
            values: self.values[rows.clone()].to_vec(),
            meta: self.meta.clone(),
            columns: self.columns.clone(),
            unit: self.unit.clone(),
            axis: self.axis.as_ref().map(|axis| match axis {
                SecondaryAxis::PerRow(data) => SecondaryAxis::PerRow(data[rows].to_vec()),
                SecondaryAxis::Fixed(bins) => SecondaryAxis::Fixed(bins.clone()),
            }),
        }
    }

    /// Copy of the rows whose timestamps fall in `[start, stop)`.
    pub fn slice_range(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> Series {
        self.slice_rows(self.index_at_or_after(start)..self.index_at_or_after(stop))
    }

    /// Copy of the rows covered by `range`.
    pub fn trim_to(&self, range: &TimeRange) -> Series {
        self.slice_range(range.start(), range.stop())
    }
}
