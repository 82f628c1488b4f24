//! Errors surfaced by the fetch collaborator.

/// An opaque failure from the fetch collaborator.
///
/// The core never interprets or recovers from provider failures; they
/// propagate to the caller as-is. Providers wrap their transport or decoding
/// errors with [`ProviderError::new`], or use [`ProviderError::message`] when
/// no source error is available.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A provider-side error with its original source preserved.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// A provider-side error described only by a message.
    #[error("{0}")]
    Message(String),
}

impl ProviderError {
    /// Wraps any error type as a provider failure.
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        ProviderError::Source(Box::new(source))
    }

    /// Creates a provider failure from a plain message.
    pub fn message(message: impl Into<String>) -> Self {
        ProviderError::Message(message.into())
    }
}
