//! In-memory store implementation with optional TTL and size limits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use super::types::{AccessSequence, TimestampMillis};
use super::{CacheEntry, CacheStats, CacheStore, StoreSnapshot};
use crate::errors::StoreError;

/// Entry in the memory store with access metadata.
#[derive(Debug, Clone)]
struct StoredEntry {
    /// The cached entry
    entry: CacheEntry,
    /// When this entry was created
    created_at: TimestampMillis,
    /// When this entry was last accessed (for LRU eviction)
    last_accessed: TimestampMillis,
    /// Sequence number for deterministic LRU ordering when timestamps tie
    access_seq: AccessSequence,
}

impl StoredEntry {
    fn new(entry: CacheEntry, access_seq: AccessSequence) -> Self {
        let now = TimestampMillis::now();
        Self {
            entry,
            created_at: now,
            last_accessed: now,
            access_seq,
        }
    }

    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        if let Some(ttl) = ttl {
            return self.created_at.is_older_than(ttl);
        }
        false
    }

    fn touch(&mut self, access_seq: AccessSequence) {
        self.last_accessed = TimestampMillis::now();
        self.access_seq = access_seq;
    }
}

/// Configuration for the memory store.
#[derive(Debug, Clone, Default)]
struct MemoryStoreConfig {
    /// Maximum number of entries before eviction starts
    max_entries: Option<usize>,
    /// Time-to-live for entries
    ttl: Option<Duration>,
}

/// Internal state for the memory store.
#[derive(Debug, Default)]
struct MemoryStoreState {
    entries: HashMap<String, StoredEntry>,
    stats: CacheStats,
    next_seq: AccessSequence,
}

impl MemoryStoreState {
    /// Removes expired entries, counting them as expirations.
    fn purge_expired(&mut self, ttl: Option<Duration>) {
        if ttl.is_none() {
            return;
        }
        let before = self.entries.len();
        self.entries.retain(|_, stored| !stored.is_expired(ttl));
        self.stats.expirations += (before - self.entries.len()) as u64;
        self.stats.entries = self.entries.len();
    }

    /// Evicts the least recently used entry.
    fn evict_lru(&mut self) {
        let lru_key = self
            .entries
            .iter()
            .min_by_key(|(_, stored)| (stored.last_accessed, stored.access_seq))
            .map(|(key, _)| key.clone());

        if let Some(key) = lru_key {
            debug!(key = %key, "evicting LRU store entry");
            self.entries.remove(&key);
            self.stats.evictions += 1;
        }
    }
}

/// In-memory store with optional TTL and size limits.
///
/// Entries live in a `HashMap` behind a `tokio` mutex. Optional TTL expires
/// entries on access; an optional entry limit evicts least-recently-used
/// entries on insert. Snapshots clone the live entries, so a snapshot is
/// immune to concurrent writes for its whole lifetime.
///
/// Clones share the same underlying entries, which lets a caller keep a
/// handle on a store after moving it into an orchestrator.
///
/// # Examples
///
/// ```rust,ignore
/// use seriescache::MemoryStore;
/// use std::time::Duration;
///
/// // Unbounded store
/// let store = MemoryStore::new();
///
/// // Bounded, with expiry
/// let store = MemoryStore::new()
///     .with_max_entries(500)
///     .with_ttl(Duration::from_secs(86400 * 7));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    config: MemoryStoreConfig,
    state: Arc<Mutex<MemoryStoreState>>,
}

impl MemoryStore {
    /// Creates a memory store with no limits.
    pub fn new() -> Self {
        Self {
            config: MemoryStoreConfig::default(),
            state: Arc::new(Mutex::new(MemoryStoreState::default())),
        }
    }

    /// Sets the maximum number of entries; LRU entries are evicted beyond it.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Sets the time-to-live; entries older than it expire when accessed.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloned view of the store taken by `scoped_transaction`.
struct MemorySnapshot {
    entries: HashMap<String, CacheEntry>,
    state: Arc<Mutex<MemoryStoreState>>,
}

#[async_trait]
impl StoreSnapshot for MemorySnapshot {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let found = self.entries.get(key).cloned();
        let mut state = self.state.lock().await;
        if found.is_some() {
            state.stats.hits += 1;
            debug!(key = %key, "snapshot hit (memory)");
        } else {
            state.stats.misses += 1;
            debug!(key = %key, "snapshot miss (memory)");
        }
        Ok(found)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let mut state = self.state.lock().await;

        let expired = state
            .entries
            .get(key)
            .map(|stored| stored.is_expired(self.config.ttl));

        match expired {
            None => {
                state.stats.misses += 1;
                debug!(key = %key, "store miss (memory)");
                Ok(None)
            }
            Some(true) => {
                debug!(key = %key, "store entry expired");
                state.entries.remove(key);
                state.stats.expirations += 1;
                state.stats.misses += 1;
                state.stats.entries = state.entries.len();
                Ok(None)
            }
            Some(false) => {
                let seq = state.next_seq;
                state.next_seq = seq.next();
                let entry = match state.entries.get_mut(key) {
                    Some(stored) => {
                        stored.touch(seq);
                        stored.entry.clone()
                    }
                    None => return Ok(None),
                };
                state.stats.hits += 1;
                debug!(key = %key, "store hit (memory)");
                Ok(Some(entry))
            }
        }
    }

    async fn set(&self, key: &str, entry: CacheEntry) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        if let Some(max_entries) = self.config.max_entries {
            while state.entries.len() >= max_entries && !state.entries.contains_key(key) {
                state.evict_lru();
            }
        }

        debug!(key = %key, "inserting entry into memory store");
        let seq = state.next_seq;
        state.next_seq = seq.next();
        state.entries.insert(key.to_string(), StoredEntry::new(entry, seq));
        state.stats.entries = state.entries.len();

        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .entries
            .get(key)
            .is_some_and(|stored| !stored.is_expired(self.config.ttl)))
    }

    async fn scoped_transaction(&self) -> Result<Box<dyn StoreSnapshot>, StoreError> {
        let mut state = self.state.lock().await;
        state.purge_expired(self.config.ttl);
        let entries = state
            .entries
            .iter()
            .map(|(key, stored)| (key.clone(), stored.entry.clone()))
            .collect();
        drop(state);

        Ok(Box::new(MemorySnapshot {
            entries,
            state: Arc::clone(&self.state),
        }))
    }

    async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        state.stats.clone()
    }

    fn name(&self) -> &'static str {
        "MemoryStore"
    }
}
