//! Shape errors for series construction.

/// Violations of the series shape invariants.
///
/// A series keeps its time vector, value rows, and any row-aligned secondary
/// axis in lockstep; these errors reject inputs that would break that.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// Time vector and value matrix disagree on row count.
    #[error("time and values must have the same length, got time: {time_len} and values: {rows}")]
    LengthMismatch {
        /// Number of timestamps
        time_len: usize,
        /// Number of value rows
        rows: usize,
    },

    /// A value row has a different width than the first row.
    #[error("value row {row} has width {width}, expected {expected}")]
    RaggedRows {
        /// Index of the offending row
        row: usize,
        /// Width of the offending row
        width: usize,
        /// Width of the first row
        expected: usize,
    },

    /// A row-aligned secondary axis does not match the row count.
    #[error("secondary axis has {axis_rows} rows, expected {rows}")]
    AxisShapeMismatch {
        /// Number of value rows
        rows: usize,
        /// Number of axis rows
        axis_rows: usize,
    },
}
