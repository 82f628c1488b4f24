//! Error types for the seriescache library.
//!
//! Each layer has its own error type for fine-grained handling:
//!
//! - [`SeriesError`] - Shape violations when constructing series
//! - [`StoreError`] - Cache backend I/O and serialization failures
//! - [`ConfigError`] - Invalid lookup options at the call boundary
//! - [`LookupError`] - Failures of a cached lookup, wrapping the others plus
//!   provider failures
//!
//! [`SeriesCacheError`] unifies them for callers that do not need to
//! distinguish error sources; every module error converts into it via `From`,
//! so `?` propagates naturally.

mod config;
mod lookup;
mod provider;
mod series;
mod store;

pub use config::ConfigError;
pub use lookup::LookupError;
pub use provider::ProviderError;
pub use series::SeriesError;
pub use store::StoreError;

/// Unified error type for all seriescache operations.
#[derive(Debug, thiserror::Error)]
pub enum SeriesCacheError {
    /// Error from a cached lookup.
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Error from a cache store backend.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error from the fetch collaborator.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Invalid lookup options.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Series shape violation.
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
}
