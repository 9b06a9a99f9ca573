//! Store interfaces.
//!
//! Providers and the cache layer receive these as injected handles
//! (`Arc<dyn RateStore>`, `Arc<dyn CacheStore>`), never a global, so an
//! in-memory store can exercise everything.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::types::{
    CacheEntry, ColaRateRow, ColaScope, FeedStatus, HousingRateRow, MileageRateRow,
    ReferenceCategory, ReferenceValueRow, SourceKey,
};

// ═══════════════════════════════════════════════════════════════════════════════
// VERSIONED BACKING TABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Read access to the versioned backing tables.
///
/// Every "latest" lookup selects the single row whose effective date is on
/// or before `as_of`, ordered by effective date descending. Identifiers are
/// passed already normalized.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Latest housing allowance row for the paygrade, area, and dependency status.
    async fn latest_housing_rate(
        &self,
        paygrade: &str,
        location_code: &str,
        with_dependents: bool,
        as_of: NaiveDate,
    ) -> Result<Option<HousingRateRow>>;

    /// Latest cost-of-living row in one table.
    async fn latest_cola_rate(
        &self,
        scope: ColaScope,
        location_code: &str,
        paygrade: &str,
        with_dependents: bool,
        as_of: NaiveDate,
    ) -> Result<Option<ColaRateRow>>;

    /// Exact (category, field, year) lookup in the key/value reference table.
    async fn reference_value(
        &self,
        category: ReferenceCategory,
        field: &str,
        year: i32,
    ) -> Result<Option<ReferenceValueRow>>;

    /// Latest mileage rate for the year that is effective on `as_of`.
    async fn latest_mileage_rate(&self, year: i32, as_of: NaiveDate)
        -> Result<Option<MileageRateRow>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// PERSISTENT CACHE + FEED BOOKKEEPING
// ═══════════════════════════════════════════════════════════════════════════════

/// Persistence for cache entries and feed status rows.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads the entry stored under `key`, expired or not.
    async fn get_entry(&self, key: &str) -> Result<Option<CacheEntry<serde_json::Value>>>;

    /// Writes `entry` under `key`, replacing any prior entry (last writer wins).
    async fn upsert_entry(&self, key: &str, entry: CacheEntry<serde_json::Value>) -> Result<()>;

    /// Deletes one entry. Returns whether it existed.
    async fn delete_entry(&self, key: &str) -> Result<bool>;

    /// Lists every key starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Deletes the given keys in one batch. Returns how many existed.
    async fn delete_entries(&self, keys: &[String]) -> Result<u64>;

    /// Deletes every entry that is no longer valid at `now`. Returns how many.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Reads the feed row for a source.
    async fn feed_status(&self, source: SourceKey) -> Result<Option<FeedStatus>>;

    /// Writes the feed row for `status.source`.
    async fn save_feed_status(&self, status: FeedStatus) -> Result<()>;

    /// Lists every feed row.
    async fn list_feeds(&self) -> Result<Vec<FeedStatus>>;
}
