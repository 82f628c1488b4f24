//! No-operation store that disables caching entirely.

use async_trait::async_trait;

use super::{CacheEntry, CacheStats, CacheStore, StoreSnapshot};
use crate::errors::StoreError;

/// A store that always misses and ignores writes.
///
/// Wiring an orchestrator with `NoOpStore` turns every lookup into a direct
/// provider fetch without touching orchestrator code; useful for tests and
/// for products that must never be cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStore;

struct NoOpSnapshot;

#[async_trait]
impl StoreSnapshot for NoOpSnapshot {
    async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, StoreError> {
        Ok(None)
    }
}

#[async_trait]
impl CacheStore for NoOpStore {
    async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, StoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _entry: CacheEntry) -> Result<(), StoreError> {
        Ok(())
    }

    async fn contains(&self, _key: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn scoped_transaction(&self) -> Result<Box<dyn StoreSnapshot>, StoreError> {
        Ok(Box::new(NoOpSnapshot))
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn name(&self) -> &'static str {
        "NoOpStore"
    }
}
