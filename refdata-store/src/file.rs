//! File-backed row store with persistence.
//!
//! Keeps every table in a [`MemoryStore`] and writes a snapshot file
//! after a configurable number of writes. Suitable for single-node
//! deployments where cache entries and feed rows should survive restarts.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use refdata_core::error::{RefDataError, Result};
use refdata_core::traits::{CacheStore, RateStore};
use refdata_core::types::{
    CacheEntry, ColaRateRow, ColaScope, FeedStatus, HousingRateRow, MileageRateRow,
    ReferenceCategory, ReferenceValueRow, SourceKey, StoreSnapshot,
};

use crate::memory::{MemoryStore, StoreStats};

/// File-backed row store.
///
/// # File Format
///
/// ```text
/// magic (4 bytes): "RDST"
/// version (1 byte): 1
/// count (8 bytes, LE): number of rows across all tables
/// snapshot (variable): JSON-serialized StoreSnapshot
/// ```
pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
    dirty: AtomicBool,
    /// Save after this many writes
    auto_save_threshold: u64,
    writes_since_save: AtomicU64,
    /// Held for the whole temp-write-and-rename so saves never interleave
    save_lock: Mutex<()>,
}

const MAGIC: &[u8; 4] = b"RDST";
const VERSION: u8 = 1;
const HEADER_LEN: usize = 13;

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// An existing file is loaded; otherwise the file is created on first save.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            memory: MemoryStore::new(),
            dirty: AtomicBool::new(false),
            auto_save_threshold: 100,
            writes_since_save: AtomicU64::new(0),
            save_lock: Mutex::new(()),
        };

        if fs::try_exists(&store.path).await? {
            store.load().await?;
        }

        Ok(store)
    }

    /// Opens the store with a custom auto-save threshold.
    pub async fn with_auto_save(path: impl AsRef<Path>, threshold: u64) -> Result<Self> {
        let mut store = Self::open(path).await?;
        store.auto_save_threshold = threshold;
        Ok(store)
    }

    #[instrument(skip(self), fields(path = ?self.path))]
    async fn load(&self) -> Result<()> {
        let contents = fs::read(&self.path).await?;

        if contents.len() < HEADER_LEN {
            return Err(RefDataError::Store("store file too short".into()));
        }
        if &contents[0..4] != MAGIC {
            return Err(RefDataError::Store("invalid magic bytes".into()));
        }
        let version = contents[4];
        if version != VERSION {
            return Err(RefDataError::VersionMismatch {
                expected: VERSION,
                actual: version,
            });
        }

        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&contents[5..HEADER_LEN]);
        let count = u64::from_le_bytes(count_bytes);
        info!(count, "Loading store from file");

        if contents.len() > HEADER_LEN {
            let snapshot: StoreSnapshot = serde_json::from_slice(&contents[HEADER_LEN..])
                .map_err(|e| RefDataError::Serialization(e.to_string()))?;
            self.memory.import(snapshot)?;
        }

        self.dirty.store(false, Ordering::SeqCst);
        debug!("Store loaded");
        Ok(())
    }

    /// Writes every table to the file atomically (temp file, then rename).
    ///
    /// Concurrent callers are serialized; writes that land after the
    /// snapshot is taken leave the store dirty for the next save.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub async fn save(&self) -> Result<()> {
        let _guard = self.save_lock.lock().await;
        self.save_locked().await
    }

    async fn save_locked(&self) -> Result<()> {
        self.dirty.store(false, Ordering::SeqCst);
        self.writes_since_save.store(0, Ordering::SeqCst);

        if let Err(e) = self.write_snapshot().await {
            self.dirty.store(true, Ordering::SeqCst);
            return Err(e);
        }
        debug!("Store saved");
        Ok(())
    }

    async fn write_snapshot(&self) -> Result<()> {
        let snapshot = self.memory.snapshot();
        let count = snapshot.row_count() as u64;

        info!(count, "Saving store to file");

        let serialized = serde_json::to_vec(&snapshot)
            .map_err(|e| RefDataError::Serialization(e.to_string()))?;

        let mut contents = Vec::with_capacity(HEADER_LEN + serialized.len());
        contents.extend_from_slice(MAGIC);
        contents.push(VERSION);
        contents.extend_from_slice(&count.to_le_bytes());
        contents.extend_from_slice(&serialized);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }

    /// Checks if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Saves if dirty.
    pub async fn flush(&self) -> Result<()> {
        if self.is_dirty() {
            self.save().await?;
        }
        Ok(())
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying memory tables.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Returns row counts per table.
    pub fn stats(&self) -> StoreStats {
        self.memory.stats()
    }

    /// Imports a snapshot and saves immediately.
    pub async fn import(&self, snapshot: StoreSnapshot) -> Result<usize> {
        let imported = self.memory.import(snapshot)?;
        self.dirty.store(true, Ordering::SeqCst);
        self.save().await?;
        Ok(imported)
    }

    async fn record_write(&self) -> Result<()> {
        self.dirty.store(true, Ordering::SeqCst);
        let writes = self.writes_since_save.fetch_add(1, Ordering::SeqCst) + 1;
        if writes < self.auto_save_threshold {
            return Ok(());
        }

        let _guard = self.save_lock.lock().await;
        // Another writer may have saved while this one waited
        if self.writes_since_save.load(Ordering::SeqCst) >= self.auto_save_threshold {
            self.save_locked().await?;
        }
        Ok(())
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if self.is_dirty() {
            warn!(path = ?self.path, "FileStore dropped with unsaved changes");
        }
    }
}

#[async_trait]
impl RateStore for FileStore {
    async fn latest_housing_rate(
        &self,
        paygrade: &str,
        location_code: &str,
        with_dependents: bool,
        as_of: NaiveDate,
    ) -> Result<Option<HousingRateRow>> {
        self.memory
            .latest_housing_rate(paygrade, location_code, with_dependents, as_of)
            .await
    }

    async fn latest_cola_rate(
        &self,
        scope: ColaScope,
        location_code: &str,
        paygrade: &str,
        with_dependents: bool,
        as_of: NaiveDate,
    ) -> Result<Option<ColaRateRow>> {
        self.memory
            .latest_cola_rate(scope, location_code, paygrade, with_dependents, as_of)
            .await
    }

    async fn reference_value(
        &self,
        category: ReferenceCategory,
        field: &str,
        year: i32,
    ) -> Result<Option<ReferenceValueRow>> {
        self.memory.reference_value(category, field, year).await
    }

    async fn latest_mileage_rate(
        &self,
        year: i32,
        as_of: NaiveDate,
    ) -> Result<Option<MileageRateRow>> {
        self.memory.latest_mileage_rate(year, as_of).await
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn get_entry(&self, key: &str) -> Result<Option<CacheEntry<serde_json::Value>>> {
        self.memory.get_entry(key).await
    }

    async fn upsert_entry(&self, key: &str, entry: CacheEntry<serde_json::Value>) -> Result<()> {
        self.memory.upsert_entry(key, entry).await?;
        self.record_write().await
    }

    async fn delete_entry(&self, key: &str) -> Result<bool> {
        let existed = self.memory.delete_entry(key).await?;
        if existed {
            self.record_write().await?;
        }
        Ok(existed)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.memory.keys_with_prefix(prefix).await
    }

    async fn delete_entries(&self, keys: &[String]) -> Result<u64> {
        let removed = self.memory.delete_entries(keys).await?;
        if removed > 0 {
            self.record_write().await?;
        }
        Ok(removed)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let removed = self.memory.purge_expired(now).await?;
        if removed > 0 {
            self.record_write().await?;
        }
        Ok(removed)
    }

    async fn feed_status(&self, source: SourceKey) -> Result<Option<FeedStatus>> {
        self.memory.feed_status(source).await
    }

    async fn save_feed_status(&self, status: FeedStatus) -> Result<()> {
        self.memory.save_feed_status(status).await?;
        self.record_write().await
    }

    async fn list_feeds(&self) -> Result<Vec<FeedStatus>> {
        self.memory.list_feeds().await
    }
}
