//! In-memory row store.
//!
//! Fast, thread-safe storage suitable for development, testing,
//! and single-process deployments.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use refdata_core::error::{RefDataError, Result};
use refdata_core::normalize::{normalize_code, normalize_field, normalize_paygrade};
use refdata_core::traits::{CacheStore, RateStore};
use refdata_core::types::{
    CacheEntry, ColaRateRow, ColaScope, FeedStatus, HousingRateRow, MileageRateRow,
    ReferenceCategory, ReferenceValueRow, SourceKey, StoreSnapshot,
};

type HousingKey = (String, String, bool);
type ColaKey = (ColaScope, String, String, bool);
type ReferenceKey = (ReferenceCategory, String, i32);

/// Store operation that can be made to fail on purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Housing allowance table reads
    HousingRates,
    /// Cost-of-living table reads
    ColaRates,
    /// Reference table reads
    ReferenceValues,
    /// Mileage table reads
    MileageRates,
    /// Cache entry reads and prefix scans
    CacheRead,
    /// Cache entry upserts
    CacheWrite,
    /// Cache entry deletes
    CacheDelete,
    /// Feed row reads
    FeedRead,
    /// Feed row writes
    FeedWrite,
}

/// Row counts per table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Housing allowance rows
    pub housing_rows: usize,
    /// Cost-of-living rows across both tables
    pub cola_rows: usize,
    /// Reference table rows
    pub reference_rows: usize,
    /// Mileage rows
    pub mileage_rows: usize,
    /// Cache entries, expired included
    pub cache_entries: usize,
    /// Feed rows
    pub feeds: usize,
}

/// In-memory row store.
///
/// # Indexing
///
/// Versioned tables are bucketed by their filter columns; each bucket is
/// kept sorted by effective date descending so "latest as of" is the first
/// row not after the requested date. Identifiers are normalized on insert.
///
/// # Testing hooks
///
/// Every trait call increments [`call_count`](Self::call_count), and
/// [`fail_operation`](Self::fail_operation) makes an operation return a
/// store error until cleared.
#[derive(Debug, Default)]
pub struct MemoryStore {
    housing_rates: DashMap<HousingKey, Vec<HousingRateRow>>,
    cola_rates: DashMap<ColaKey, Vec<ColaRateRow>>,
    reference_values: DashMap<ReferenceKey, ReferenceValueRow>,
    mileage_rates: DashMap<i32, Vec<MileageRateRow>>,
    cache_entries: DashMap<String, CacheEntry<serde_json::Value>>,
    feeds: DashMap<SourceKey, FeedStatus>,
    calls: AtomicU64,
    failing: RwLock<HashSet<StoreOperation>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let store = Self::new();
        store.import(snapshot)?;
        Ok(store)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Writes (scraper side)
    // ───────────────────────────────────────────────────────────────────────────

    /// Inserts a housing allowance row.
    pub fn insert_housing_rate(&self, mut row: HousingRateRow) -> Result<()> {
        row.paygrade = normalize_paygrade(&row.paygrade);
        row.location_code = normalize_code(&row.location_code);
        require_non_empty("housing paygrade", &row.paygrade)?;
        require_non_empty("housing location code", &row.location_code)?;

        let key = (row.paygrade.clone(), row.location_code.clone(), row.with_dependents);
        let mut bucket = self.housing_rates.entry(key).or_default();
        bucket.retain(|r| r.effective_date != row.effective_date);
        bucket.push(row);
        bucket.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
        Ok(())
    }

    /// Inserts a cost-of-living row.
    pub fn insert_cola_rate(&self, mut row: ColaRateRow) -> Result<()> {
        row.paygrade = normalize_paygrade(&row.paygrade);
        row.location_code = normalize_code(&row.location_code);
        require_non_empty("COLA paygrade", &row.paygrade)?;
        require_non_empty("COLA location code", &row.location_code)?;

        let key = (
            row.scope,
            row.location_code.clone(),
            row.paygrade.clone(),
            row.with_dependents,
        );
        let mut bucket = self.cola_rates.entry(key).or_default();
        bucket.retain(|r| r.effective_date != row.effective_date);
        bucket.push(row);
        bucket.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
        Ok(())
    }

    /// Inserts or replaces a reference table row.
    pub fn insert_reference_value(&self, mut row: ReferenceValueRow) -> Result<()> {
        row.field = normalize_field(&row.field);
        require_non_empty("reference field", &row.field)?;

        let key = (row.category, row.field.clone(), row.year);
        self.reference_values.insert(key, row);
        Ok(())
    }

    /// Inserts a mileage rate row.
    pub fn insert_mileage_rate(&self, row: MileageRateRow) -> Result<()> {
        if !row.rate_per_mile.is_finite() || row.rate_per_mile < 0.0 {
            return Err(RefDataError::Validation(format!(
                "mileage rate for {} must be a non-negative number",
                row.year
            )));
        }

        let mut bucket = self.mileage_rates.entry(row.year).or_default();
        bucket.retain(|r| r.effective_date != row.effective_date);
        bucket.push(row);
        bucket.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
        Ok(())
    }

    /// Imports every table of a snapshot.
    ///
    /// Returns the number of backing-table rows imported.
    pub fn import(&self, snapshot: StoreSnapshot) -> Result<usize> {
        let imported = snapshot.row_count();

        for row in snapshot.housing_rates {
            self.insert_housing_rate(row)?;
        }
        for row in snapshot.cola_rates {
            self.insert_cola_rate(row)?;
        }
        for row in snapshot.reference_values {
            self.insert_reference_value(row)?;
        }
        for row in snapshot.mileage_rates {
            self.insert_mileage_rate(row)?;
        }
        for (key, entry) in snapshot.cache_entries {
            self.cache_entries.insert(key, entry);
        }
        for feed in snapshot.feeds {
            self.feeds.insert(feed.source, feed);
        }

        debug!(imported, "Imported snapshot");
        Ok(imported)
    }

    /// Exports every table (for persistence/backup).
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut snapshot = StoreSnapshot {
            housing_rates: self
                .housing_rates
                .iter()
                .flat_map(|e| e.value().clone())
                .collect(),
            cola_rates: self.cola_rates.iter().flat_map(|e| e.value().clone()).collect(),
            reference_values: self
                .reference_values
                .iter()
                .map(|e| e.value().clone())
                .collect(),
            mileage_rates: self
                .mileage_rates
                .iter()
                .flat_map(|e| e.value().clone())
                .collect(),
            cache_entries: self
                .cache_entries
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
            feeds: self.feeds.iter().map(|e| e.value().clone()).collect(),
        };
        snapshot.feeds.sort_by_key(|f| f.source);
        snapshot
    }

    /// Clears every table and resets the testing hooks.
    pub fn clear(&self) {
        self.housing_rates.clear();
        self.cola_rates.clear();
        self.reference_values.clear();
        self.mileage_rates.clear();
        self.cache_entries.clear();
        self.feeds.clear();
        self.calls.store(0, Ordering::SeqCst);
        self.failing.write().clear();
    }

    /// Returns row counts per table.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            housing_rows: self.housing_rates.iter().map(|e| e.value().len()).sum(),
            cola_rows: self.cola_rates.iter().map(|e| e.value().len()).sum(),
            reference_rows: self.reference_values.len(),
            mileage_rows: self.mileage_rates.iter().map(|e| e.value().len()).sum(),
            cache_entries: self.cache_entries.len(),
            feeds: self.feeds.len(),
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Testing hooks
    // ───────────────────────────────────────────────────────────────────────────

    /// Number of trait calls served since creation or the last reset.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resets the call counter.
    pub fn reset_call_count(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Makes `op` fail with a store error until [`clear_failures`](Self::clear_failures).
    pub fn fail_operation(&self, op: StoreOperation) {
        self.failing.write().insert(op);
    }

    /// Stops injecting failures.
    pub fn clear_failures(&self) {
        self.failing.write().clear();
    }

    /// Counts the call and applies any injected failure.
    fn begin(&self, op: StoreOperation) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().contains(&op) {
            return Err(RefDataError::Store(format!("injected failure: {op:?}")));
        }
        Ok(())
    }
}

fn require_non_empty(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(RefDataError::Validation(format!("{what} cannot be empty")));
    }
    Ok(())
}

#[async_trait]
impl RateStore for MemoryStore {
    #[instrument(skip(self))]
    async fn latest_housing_rate(
        &self,
        paygrade: &str,
        location_code: &str,
        with_dependents: bool,
        as_of: NaiveDate,
    ) -> Result<Option<HousingRateRow>> {
        self.begin(StoreOperation::HousingRates)?;
        let key = (paygrade.to_string(), location_code.to_string(), with_dependents);
        Ok(self.housing_rates.get(&key).and_then(|bucket| {
            bucket
                .iter()
                .find(|r| r.effective_date <= as_of)
                .cloned()
        }))
    }

    #[instrument(skip(self))]
    async fn latest_cola_rate(
        &self,
        scope: ColaScope,
        location_code: &str,
        paygrade: &str,
        with_dependents: bool,
        as_of: NaiveDate,
    ) -> Result<Option<ColaRateRow>> {
        self.begin(StoreOperation::ColaRates)?;
        let key = (
            scope,
            location_code.to_string(),
            paygrade.to_string(),
            with_dependents,
        );
        Ok(self.cola_rates.get(&key).and_then(|bucket| {
            bucket
                .iter()
                .find(|r| r.effective_date <= as_of)
                .cloned()
        }))
    }

    #[instrument(skip(self))]
    async fn reference_value(
        &self,
        category: ReferenceCategory,
        field: &str,
        year: i32,
    ) -> Result<Option<ReferenceValueRow>> {
        self.begin(StoreOperation::ReferenceValues)?;
        let key = (category, field.to_string(), year);
        Ok(self.reference_values.get(&key).map(|row| row.clone()))
    }

    #[instrument(skip(self))]
    async fn latest_mileage_rate(
        &self,
        year: i32,
        as_of: NaiveDate,
    ) -> Result<Option<MileageRateRow>> {
        self.begin(StoreOperation::MileageRates)?;
        Ok(self.mileage_rates.get(&year).and_then(|bucket| {
            bucket
                .iter()
                .find(|r| r.effective_date <= as_of)
                .cloned()
        }))
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get_entry(&self, key: &str) -> Result<Option<CacheEntry<serde_json::Value>>> {
        self.begin(StoreOperation::CacheRead)?;
        Ok(self.cache_entries.get(key).map(|e| e.clone()))
    }

    async fn upsert_entry(&self, key: &str, entry: CacheEntry<serde_json::Value>) -> Result<()> {
        self.begin(StoreOperation::CacheWrite)?;
        self.cache_entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete_entry(&self, key: &str) -> Result<bool> {
        self.begin(StoreOperation::CacheDelete)?;
        Ok(self.cache_entries.remove(key).is_some())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.begin(StoreOperation::CacheRead)?;
        let mut keys: Vec<String> = self
            .cache_entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete_entries(&self, keys: &[String]) -> Result<u64> {
        self.begin(StoreOperation::CacheDelete)?;
        let removed = keys
            .iter()
            .filter(|key| self.cache_entries.remove(key.as_str()).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        self.begin(StoreOperation::CacheDelete)?;
        let mut removed = 0u64;
        self.cache_entries.retain(|_, entry| {
            let keep = entry.is_valid_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn feed_status(&self, source: SourceKey) -> Result<Option<FeedStatus>> {
        self.begin(StoreOperation::FeedRead)?;
        Ok(self.feeds.get(&source).map(|f| f.clone()))
    }

    async fn save_feed_status(&self, status: FeedStatus) -> Result<()> {
        self.begin(StoreOperation::FeedWrite)?;
        self.feeds.insert(status.source, status);
        Ok(())
    }

    async fn list_feeds(&self) -> Result<Vec<FeedStatus>> {
        self.begin(StoreOperation::FeedRead)?;
        let mut feeds: Vec<FeedStatus> = self.feeds.iter().map(|f| f.clone()).collect();
        feeds.sort_by_key(|f| f.source);
        Ok(feeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use refdata_core::types::DataFormat;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn housing(rate_cents: i64, effective: NaiveDate) -> HousingRateRow {
        HousingRateRow {
            paygrade: "E05".into(),
            location_code: "AB123".into(),
            with_dependents: true,
            rate_cents,
            effective_date: effective,
        }
    }

    #[tokio::test]
    async fn test_latest_housing_rate_as_of() {
        let store = MemoryStore::new();
        store.insert_housing_rate(housing(230_000, date(2024, 1, 1))).unwrap();
        store.insert_housing_rate(housing(245_000, date(2025, 1, 1))).unwrap();

        let row = store
            .latest_housing_rate("E05", "AB123", true, date(2025, 6, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.rate_cents, 245_000);

        let row = store
            .latest_housing_rate("E05", "AB123", true, date(2024, 12, 31))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.rate_cents, 230_000);

        // Before any version took effect
        let none = store
            .latest_housing_rate("E05", "AB123", true, date(2023, 6, 1))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_insert_normalizes_identifiers() {
        let store = MemoryStore::new();
        let mut row = housing(245_000, date(2025, 1, 1));
        row.paygrade = "e-5".into();
        row.location_code = "ab-123".into();
        store.insert_housing_rate(row).unwrap();

        let found = store
            .latest_housing_rate("E05", "AB123", true, date(2025, 1, 1))
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_dependency_flag_is_part_of_key() {
        let store = MemoryStore::new();
        store.insert_housing_rate(housing(245_000, date(2025, 1, 1))).unwrap();

        let without = store
            .latest_housing_rate("E05", "AB123", false, date(2025, 6, 1))
            .await
            .unwrap();
        assert!(without.is_none());
    }

    #[tokio::test]
    async fn test_same_effective_date_replaces() {
        let store = MemoryStore::new();
        store.insert_housing_rate(housing(240_000, date(2025, 1, 1))).unwrap();
        store.insert_housing_rate(housing(245_000, date(2025, 1, 1))).unwrap();

        assert_eq!(store.stats().housing_rows, 1);
    }

    #[tokio::test]
    async fn test_cola_tables_are_separate() {
        let store = MemoryStore::new();
        store
            .insert_cola_rate(ColaRateRow {
                scope: ColaScope::Overseas,
                location_code: "GE001".into(),
                paygrade: "E05".into(),
                with_dependents: false,
                value: 0.24,
                format: DataFormat::Percent,
                effective_date: date(2025, 1, 1),
            })
            .unwrap();

        let domestic = store
            .latest_cola_rate(ColaScope::Domestic, "GE001", "E05", false, date(2025, 2, 1))
            .await
            .unwrap();
        assert!(domestic.is_none());

        let overseas = store
            .latest_cola_rate(ColaScope::Overseas, "GE001", "E05", false, date(2025, 2, 1))
            .await
            .unwrap();
        assert!(overseas.is_some());
    }

    #[tokio::test]
    async fn test_reference_value_composite_key() {
        let store = MemoryStore::new();
        store
            .insert_reference_value(ReferenceValueRow {
                category: ReferenceCategory::TaxRetirementLimits,
                field: "Elective Deferral".into(),
                year: 2025,
                value: 2_350_000.0,
                format: DataFormat::Money,
                unit: Some("USD".into()),
                source_name: "IRS".into(),
                source_url: None,
                as_of: date(2024, 11, 1),
            })
            .unwrap();

        let hit = store
            .reference_value(ReferenceCategory::TaxRetirementLimits, "elective_deferral", 2025)
            .await
            .unwrap();
        assert!(hit.is_some());

        let wrong_year = store
            .reference_value(ReferenceCategory::TaxRetirementLimits, "elective_deferral", 2024)
            .await
            .unwrap();
        assert!(wrong_year.is_none());

        let wrong_category = store
            .reference_value(ReferenceCategory::HealthPlanCosts, "elective_deferral", 2025)
            .await
            .unwrap();
        assert!(wrong_category.is_none());
    }

    #[tokio::test]
    async fn test_mileage_mid_year_revision() {
        let store = MemoryStore::new();
        for (rate, effective) in [(0.585, date(2022, 1, 1)), (0.625, date(2022, 7, 1))] {
            store
                .insert_mileage_rate(MileageRateRow {
                    year: 2022,
                    rate_per_mile: rate,
                    effective_date: effective,
                    source_url: None,
                })
                .unwrap();
        }

        let h1 = store.latest_mileage_rate(2022, date(2022, 3, 1)).await.unwrap().unwrap();
        assert_eq!(h1.rate_per_mile, 0.585);
        let h2 = store.latest_mileage_rate(2022, date(2022, 9, 1)).await.unwrap().unwrap();
        assert_eq!(h2.rate_per_mile, 0.625);
    }

    #[tokio::test]
    async fn test_invalid_rows_rejected() {
        let store = MemoryStore::new();
        let mut row = housing(1, date(2025, 1, 1));
        row.location_code = "--".into();
        assert!(store.insert_housing_rate(row).is_err());

        let bad_rate = MileageRateRow {
            year: 2025,
            rate_per_mile: f64::NAN,
            effective_date: date(2025, 1, 1),
            source_url: None,
        };
        assert!(store.insert_mileage_rate(bad_rate).is_err());
    }

    #[tokio::test]
    async fn test_cache_entries_prefix_ops() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        for key in ["housing_allowance:a", "housing_allowance:b", "mileage_rate:c"] {
            store
                .upsert_entry(key, CacheEntry::new(serde_json::json!(1), now, 60))
                .await
                .unwrap();
        }

        let keys = store.keys_with_prefix("housing_allowance:").await.unwrap();
        assert_eq!(keys, vec!["housing_allowance:a", "housing_allowance:b"]);

        let removed = store.delete_entries(&keys).await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.get_entry("mileage_rate:c").await.unwrap().is_some());
        assert!(store.delete_entry("mileage_rate:c").await.unwrap());
        assert!(!store.delete_entry("mileage_rate:c").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_entries() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        store
            .upsert_entry("short", CacheEntry::new(serde_json::json!(1), now, 60))
            .await
            .unwrap();
        store
            .upsert_entry("long", CacheEntry::new(serde_json::json!(2), now, 3_600))
            .await
            .unwrap();

        let later = now + chrono::Duration::seconds(60);
        assert_eq!(store.purge_expired(later).await.unwrap(), 1);
        assert!(store.get_entry("short").await.unwrap().is_none());
        assert!(store.get_entry("long").await.unwrap().is_some());
        assert_eq!(store.purge_expired(later).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_last_writer_wins() {
        let store = MemoryStore::new();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        store
            .upsert_entry("k", CacheEntry::new(serde_json::json!(1), now, 60))
            .await
            .unwrap();
        store
            .upsert_entry("k", CacheEntry::new(serde_json::json!(2), now, 60))
            .await
            .unwrap();

        let entry = store.get_entry("k").await.unwrap().unwrap();
        assert_eq!(entry.value, serde_json::json!(2));
        assert_eq!(store.stats().cache_entries, 1);
    }

    #[tokio::test]
    async fn test_call_count_and_fault_injection() {
        let store = MemoryStore::new();
        assert_eq!(store.call_count(), 0);

        store.get_entry("missing").await.unwrap();
        store.list_feeds().await.unwrap();
        assert_eq!(store.call_count(), 2);

        store.fail_operation(StoreOperation::CacheRead);
        let err = store.get_entry("missing").await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(store.call_count(), 3);

        store.clear_failures();
        assert!(store.get_entry("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_feed_rows() {
        let store = MemoryStore::new();
        store
            .save_feed_status(FeedStatus::new(SourceKey::MileageRate))
            .await
            .unwrap();
        store
            .save_feed_status(FeedStatus::new(SourceKey::HousingAllowance))
            .await
            .unwrap();

        let feeds = store.list_feeds().await.unwrap();
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0].source, SourceKey::HousingAllowance);
        assert!(store
            .feed_status(SourceKey::MileageRate)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let store = MemoryStore::new();
        store.insert_housing_rate(housing(245_000, date(2025, 1, 1))).unwrap();
        store
            .save_feed_status(FeedStatus::new(SourceKey::HousingAllowance))
            .await
            .unwrap();

        let copy = MemoryStore::from_snapshot(store.snapshot()).unwrap();
        assert_eq!(copy.stats(), store.stats());
    }

    #[test]
    fn test_clear_resets_hooks() {
        let store = MemoryStore::new();
        store.insert_housing_rate(housing(245_000, date(2025, 1, 1))).unwrap();
        store.fail_operation(StoreOperation::HousingRates);
        assert!(tokio_test::block_on(store.latest_housing_rate(
            "E05",
            "AB123",
            true,
            date(2025, 1, 1)
        ))
        .is_err());

        store.clear();
        assert_eq!(store.call_count(), 0);
        assert_eq!(store.stats(), StoreStats::default());
        let row = tokio_test::block_on(store.latest_housing_rate("E05", "AB123", true, date(2025, 1, 1)))
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_upserts() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        let mut tasks = JoinSet::new();

        for i in 0..100u32 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .upsert_entry(&format!("k{i}"), CacheEntry::new(serde_json::json!(i), now, 60))
                    .await
                    .unwrap()
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        assert_eq!(store.stats().cache_entries, 100);
    }
}
