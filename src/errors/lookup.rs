//! Error types for cached lookups.

use super::{ConfigError, ProviderError, StoreError};

/// Failures of a cached series lookup.
///
/// Absence of data is not an error: a lookup that finds nothing returns
/// `Ok(None)`. This type covers the ways a lookup can actually fail, which
/// is an invalid request, a store failure, or a provider failure passed
/// through untouched.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The requested time range is invalid.
    #[error("invalid time range: {reason}")]
    InvalidRange {
        /// Why the range was rejected
        reason: String,
    },

    /// A timestamp could not be constructed during fragment planning.
    #[error("timestamp error: {details}")]
    Timestamp {
        /// Details about the failed conversion
        details: String,
    },

    /// Invalid lookup options.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cache store failure on the read or write path.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Fetch collaborator failure, propagated as-is.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl LookupError {
    /// Create an `InvalidRange` error with a reason.
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        LookupError::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Create a `Timestamp` error with details.
    pub fn timestamp(details: impl Into<String>) -> Self {
        LookupError::Timestamp {
            details: details.into(),
        }
    }
}
