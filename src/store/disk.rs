//! Disk-based store implementation with format versioning and TTL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::types::TimestampMillis;
use super::{CacheEntry, CacheStats, CacheStore, StoreSnapshot};
use crate::errors::StoreError;

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// Entry on disk with the metadata eviction and TTL need.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    entry: CacheEntry,
    #[serde(default)]
    created_at: TimestampMillis,
}

impl StoredEntry {
    fn new(entry: CacheEntry) -> Self {
        Self {
            entry,
            created_at: TimestampMillis::now(),
        }
    }

    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        if let Some(ttl) = ttl {
            return self.created_at.is_older_than(ttl);
        }
        false
    }
}

/// Serialized store format (versioned).
#[derive(Debug, Serialize, Deserialize)]
struct StoreData {
    version: u32,
    entries: HashMap<String, StoredEntry>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// Configuration for the disk store.
#[derive(Debug, Clone, Default)]
struct DiskStoreConfig {
    max_entries: Option<usize>,
    ttl: Option<Duration>,
}

#[derive(Debug, Default)]
struct DiskStoreState {
    stats: CacheStats,
}

/// Disk-based store persisting fragments as a single JSON file.
///
/// Saves are atomic (write to a temp file, then rename), the file format
/// carries a version field for future migrations, and an unreadable or
/// mismatched file degrades to an empty store with a warning instead of
/// failing lookups. Optional TTL and oldest-first size eviction.
///
/// # Examples
///
/// ```rust,ignore
/// use seriescache::DiskStore;
/// use std::time::Duration;
///
/// let store = DiskStore::new("fragments.json")
///     .with_ttl(Duration::from_secs(86400 * 14))
///     .with_max_entries(10_000)
///     .validate()?;
/// ```
#[derive(Debug)]
pub struct DiskStore {
    path: PathBuf,
    config: DiskStoreConfig,
    state: Arc<Mutex<DiskStoreState>>,
}

impl DiskStore {
    /// Creates a disk store at `path`.
    ///
    /// The path is not touched until the first I/O operation; call
    /// [`validate()`](Self::validate) to check it immediately.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: DiskStoreConfig::default(),
            state: Arc::new(Mutex::new(DiskStoreState::default())),
        }
    }

    /// Sets the maximum number of entries; oldest entries are evicted beyond
    /// it.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Sets the time-to-live; entries older than it expire when accessed.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }

    /// Validates the store path, creating the parent directory if needed and
    /// checking that it is writable.
    pub fn validate(self) -> Result<Self, StoreError> {
        let parent = self.path.parent().ok_or_else(|| {
            StoreError::io(
                self.path.display().to_string(),
                "store path has no parent directory",
                None,
            )
        })?;

        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::io(
                    parent.display().to_string(),
                    "failed to create store directory",
                    Some(e),
                )
            })?;
            debug!(path = %parent.display(), "created store directory");
        }

        let test_file = parent.join(".store_write_test");
        std::fs::write(&test_file, b"test").map_err(|e| {
            StoreError::io(
                parent.display().to_string(),
                "store directory is not writable",
                Some(e),
            )
        })?;
        let _ = std::fs::remove_file(&test_file);

        debug!(path = %self.path.display(), "store path validated");
        Ok(self)
    }

    /// Loads the store file; missing, unreadable, or version-mismatched files
    /// degrade to an empty store.
    async fn load(&self) -> Result<StoreData, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "store file does not exist, using empty store");
            return Ok(StoreData::default());
        }

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            StoreError::io(
                self.path.display().to_string(),
                "failed to read store file",
                Some(e),
            )
        })?;

        let data: StoreData = match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to parse store file, using empty store"
                );
                return Ok(StoreData::default());
            }
        };

        if data.version != FORMAT_VERSION {
            warn!(
                path = %self.path.display(),
                stored_version = data.version,
                current_version = FORMAT_VERSION,
                "store format version mismatch, ignoring stored data"
            );
            return Ok(StoreData::default());
        }

        info!(
            path = %self.path.display(),
            entries = data.entries.len(),
            "loaded fragment store"
        );

        Ok(data)
    }

    /// Saves the store atomically via a temp file rename.
    async fn save(&self, data: &StoreData) -> Result<(), StoreError> {
        let json = serde_json::to_vec(data)
            .map_err(|e| StoreError::serialization("failed to encode store file", e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::io(
                        parent.display().to_string(),
                        "failed to create store directory",
                        Some(e),
                    )
                })?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json).await.map_err(|e| {
            StoreError::io(
                temp_path.display().to_string(),
                "failed to write store file",
                Some(e),
            )
        })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| {
                StoreError::io(
                    self.path.display().to_string(),
                    "failed to move store file into place",
                    Some(e),
                )
            })?;

        debug!(
            path = %self.path.display(),
            entries = data.entries.len(),
            "saved fragment store"
        );

        Ok(())
    }

    /// Evicts the oldest entries down to `max_entries`, returning the count.
    fn evict_oldest(data: &mut StoreData, max_entries: usize) -> u64 {
        let mut evicted = 0;

        while data.entries.len() > max_entries {
            let oldest_key = data
                .entries
                .iter()
                .min_by_key(|(_, stored)| stored.created_at)
                .map(|(key, _)| key.clone());

            match oldest_key {
                Some(key) => {
                    debug!(key = %key, "evicting oldest store entry");
                    data.entries.remove(&key);
                    evicted += 1;
                }
                None => break,
            }
        }

        evicted
    }
}

/// Snapshot taken from one load of the store file.
struct DiskSnapshot {
    entries: HashMap<String, CacheEntry>,
    state: Arc<Mutex<DiskStoreState>>,
}

#[async_trait]
impl StoreSnapshot for DiskSnapshot {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let found = self.entries.get(key).cloned();
        let mut state = self.state.lock().await;
        if found.is_some() {
            state.stats.hits += 1;
            debug!(key = %key, "snapshot hit (disk)");
        } else {
            state.stats.misses += 1;
            debug!(key = %key, "snapshot miss (disk)");
        }
        Ok(found)
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let mut state = self.state.lock().await;
        let data = self.load().await?;

        match data.entries.get(key) {
            Some(stored) if stored.is_expired(self.config.ttl) => {
                debug!(key = %key, "store entry expired");
                state.stats.expirations += 1;
                state.stats.misses += 1;
                Ok(None)
            }
            Some(stored) => {
                state.stats.hits += 1;
                debug!(key = %key, "store hit (disk)");
                Ok(Some(stored.entry.clone()))
            }
            None => {
                state.stats.misses += 1;
                debug!(key = %key, "store miss (disk)");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, entry: CacheEntry) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut data = self.load().await?;

        data.entries
            .insert(key.to_string(), StoredEntry::new(entry));

        if let Some(max_entries) = self.config.max_entries {
            state.stats.evictions += Self::evict_oldest(&mut data, max_entries);
        }

        state.stats.entries = data.entries.len();
        self.save(&data).await
    }

    async fn contains(&self, key: &str) -> Result<bool, StoreError> {
        let _state = self.state.lock().await;
        let data = self.load().await?;
        Ok(data
            .entries
            .get(key)
            .is_some_and(|stored| !stored.is_expired(self.config.ttl)))
    }

    async fn scoped_transaction(&self) -> Result<Box<dyn StoreSnapshot>, StoreError> {
        let mut state = self.state.lock().await;
        let data = self.load().await?;

        let before = data.entries.len();
        let entries: HashMap<String, CacheEntry> = data
            .entries
            .into_iter()
            .filter(|(_, stored)| !stored.is_expired(self.config.ttl))
            .map(|(key, stored)| (key, stored.entry))
            .collect();
        state.stats.expirations += (before - entries.len()) as u64;
        drop(state);

        Ok(Box::new(DiskSnapshot {
            entries,
            state: Arc::clone(&self.state),
        }))
    }

    async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        state.stats.clone()
    }

    fn name(&self) -> &'static str {
        "DiskStore"
    }
}
