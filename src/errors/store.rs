//! Error types for cache store backends.

/// Failures of a cache store backend.
///
/// Covers filesystem I/O and serialization problems in the shipped backends.
/// Backends degrade softly where it is safe (an unreadable cache file is
/// treated as empty and logged), so these errors surface only when an
/// operation genuinely cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Error reading from or writing to the backing storage.
    #[error("store I/O error at {path}: {details}")]
    Io {
        /// Path of the file or directory involved
        path: String,
        /// What the backend was doing when it failed
        details: String,
        /// The underlying I/O error, if available
        #[source]
        source: Option<std::io::Error>,
    },

    /// Error serializing or deserializing cache entries.
    #[error("store serialization error: {details}")]
    Serialization {
        /// Details about the serialization error
        details: String,
        /// The underlying serialization error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Create an `Io` error for `path` with context.
    pub fn io(
        path: impl Into<String>,
        details: impl Into<String>,
        source: Option<std::io::Error>,
    ) -> Self {
        StoreError::Io {
            path: path.into(),
            details: details.into(),
            source,
        }
    }

    /// Create a `Serialization` error from any serialization error.
    pub fn serialization(
        details: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Serialization {
            details: details.into(),
            source: Box::new(source),
        }
    }
}
