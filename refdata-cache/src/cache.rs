//! Cache-aside over the persistent cache store.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use refdata_core::clock::Clock;
use refdata_core::error::Result;
use refdata_core::traits::CacheStore;
use refdata_core::types::CacheEntry;

/// A value returned by [`RefDataCache::get_cached`].
#[derive(Clone, Debug, PartialEq)]
pub struct Cached<T> {
    /// The value
    pub data: T,
    /// Whether it was served without calling the fetch closure
    pub from_cache: bool,
}

/// Cache counters since creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Valid entries served
    pub hits: u64,
    /// Fetch closure invocations
    pub misses: u64,
    /// Entries written back
    pub writes: u64,
    /// Store reads or writes that failed and were downgraded
    pub store_errors: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    store_errors: AtomicU64,
}

/// Persistent TTL cache.
///
/// Correctness never depends on the store: a failed read is a miss and a
/// failed write is logged and dropped. Only an error from the fetch closure
/// reaches the caller.
pub struct RefDataCache {
    pub(crate) store: Arc<dyn CacheStore>,
    pub(crate) clock: Arc<dyn Clock>,
    counters: Counters,
}

impl RefDataCache {
    /// Creates a cache over the given store and clock.
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            counters: Counters::default(),
        }
    }

    /// Returns the valid entry for `key`, or calls `fetch` and stores its
    /// result for `ttl_seconds`.
    #[instrument(skip(self, fetch))]
    pub async fn get_cached<T, F, Fut>(&self, key: &str, ttl_seconds: u64, fetch: F) -> Result<Cached<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(data) = self.read_valid(key).await {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit");
            return Ok(Cached {
                data,
                from_cache: true,
            });
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache miss");
        let data = fetch().await?;

        match serde_json::to_value(&data) {
            Ok(value) => {
                let entry = CacheEntry::new(value, self.clock.now(), ttl_seconds);
                match self.store.upsert_entry(key, entry).await {
                    Ok(()) => {
                        self.counters.writes.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
                        warn!(error = %e, "Cache write failed");
                    }
                }
            }
            Err(e) => warn!(error = %e, "Cache value not serializable, skipping write"),
        }

        Ok(Cached {
            data,
            from_cache: false,
        })
    }

    async fn read_valid<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = match self.store.get_entry(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                self.counters.store_errors.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        if !entry.is_valid_at(self.clock.now()) {
            debug!(expires_at = %entry.expires_at, "Cache entry expired");
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(error = %e, "Cached value unreadable, treating as miss");
                None
            }
        }
    }

    /// Deletes one entry. Returns whether it existed.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, key: &str) -> Result<bool> {
        self.store.delete_entry(key).await
    }

    /// Deletes every entry whose key starts with `prefix` in one batch.
    #[instrument(skip(self))]
    pub async fn invalidate_pattern(&self, prefix: &str) -> Result<u64> {
        let keys = self.store.keys_with_prefix(prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let removed = self.store.delete_entries(&keys).await?;
        debug!(removed, "Invalidated prefix");
        Ok(removed)
    }

    /// Drops every entry that has expired as of the cache clock.
    #[instrument(skip(self))]
    pub async fn prune_expired(&self) -> Result<u64> {
        let removed = self.store.purge_expired(self.clock.now()).await?;
        if removed > 0 {
            debug!(removed, "Pruned expired entries");
        }
        Ok(removed)
    }

    /// Returns counters since creation.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            store_errors: self.counters.store_errors.load(Ordering::Relaxed),
        }
    }
}
