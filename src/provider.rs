//! The fetch collaborator interface.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::errors::ProviderError;
use crate::lookup::LookupOptions;
use crate::range::TimeRange;
use crate::series::Series;
use crate::version::VersionTag;

/// What a provider receives alongside the product and range.
///
/// `extra` carries the caller's pass-through options unchanged.
/// `if_newer_than` is set only by the retention policy's conditional
/// revalidation: a provider that can honor it returns `None` when nothing
/// newer than the tag exists, which lets the cache keep its payload and just
/// refresh the staleness clock.
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// Only return data strictly newer than this tag.
    pub if_newer_than: Option<VersionTag>,
    /// Caller options forwarded unchanged.
    pub extra: BTreeMap<String, String>,
}

impl FetchRequest {
    /// Builds a request carrying the lookup's pass-through options.
    pub fn from_options(options: &LookupOptions) -> Self {
        Self {
            if_newer_than: None,
            extra: options.extra.clone(),
        }
    }

    /// Sets the conditional revalidation tag.
    pub fn with_if_newer_than(mut self, tag: Option<VersionTag>) -> Self {
        self.if_newer_than = tag;
        self
    }
}

/// Fetch collaborator producing series data for a product over a time range.
///
/// Transport, decoding, retries, and timeouts all live behind this trait.
/// Returning `Ok(None)` means the provider has no data for the range (or,
/// under `if_newer_than`, nothing newer) — that is a gap, not an error.
/// `Err` propagates to the lookup caller untouched; the cache performs no
/// recovery of its own.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Fetches `product` over `range`.
    async fn fetch(
        &self,
        product: &str,
        range: TimeRange,
        request: &FetchRequest,
    ) -> Result<Option<Series>, ProviderError>;
}
