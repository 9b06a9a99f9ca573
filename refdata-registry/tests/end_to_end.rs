//! End-to-end resolution against an in-memory store and a manual clock.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};

use refdata_cache::source_prefix;
use refdata_core::clock::ManualClock;
use refdata_core::error::{RefDataError, Result};
use refdata_core::format::{format_money_cents, parse_money_cents};
use refdata_core::traits::RateStore;
use refdata_core::types::{
    ColaRateRow, ColaScope, DataFormat, DataRefRequest, HousingRateRow, MileageRateRow,
    ReferenceCategory, ReferenceValueRow, SourceKey, StoreSnapshot,
};
use refdata_registry::{DataRefRegistry, EngineConfig};
use refdata_store::{MemoryStore, StoreOperation};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn snapshot() -> StoreSnapshot {
    StoreSnapshot {
        housing_rates: vec![HousingRateRow {
            paygrade: "E05".into(),
            location_code: "AB123".into(),
            with_dependents: true,
            rate_cents: 245_000,
            effective_date: date(2025, 1, 1),
        }],
        cola_rates: vec![ColaRateRow {
            scope: ColaScope::Overseas,
            location_code: "GE001".into(),
            paygrade: "E05".into(),
            with_dependents: true,
            value: 38_000.0,
            format: DataFormat::Money,
            effective_date: date(2025, 1, 1),
        }],
        reference_values: vec![ReferenceValueRow {
            category: ReferenceCategory::TaxRetirementLimits,
            field: "elective_deferral".into(),
            year: 2025,
            value: 2_350_000.0,
            format: DataFormat::Money,
            unit: Some("USD".into()),
            source_name: "Internal Revenue Service".into(),
            source_url: None,
            as_of: date(2024, 11, 1),
        }],
        mileage_rates: vec![MileageRateRow {
            year: 2025,
            rate_per_mile: 0.67,
            effective_date: date(2025, 1, 1),
            source_url: None,
        }],
        ..Default::default()
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    registry: DataRefRegistry,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::from_snapshot(snapshot()).unwrap());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
    ));
    let registry = DataRefRegistry::from_store(store.clone(), clock.clone(), EngineConfig::default());
    Harness {
        store,
        clock,
        registry,
    }
}

fn housing_request() -> DataRefRequest {
    DataRefRequest::new("housing_allowance")
        .paygrade("E05")
        .code("AB123")
        .with_dependents(true)
}

#[tokio::test]
async fn test_housing_end_to_end() {
    let h = harness();
    let result = h.registry.resolve(&housing_request()).await;

    assert!(result.error.is_none());
    let data = result.data.unwrap();
    assert_eq!(data.value, 245_000.0);
    assert_eq!(data.currency.as_deref(), Some("USD"));
    assert_eq!(data.as_of, date(2025, 1, 1));
    assert_eq!(data.format, DataFormat::Money);
    assert_eq!(data.display_value, "$2,450.00");
}

#[tokio::test]
async fn test_second_resolve_is_cached_and_identical() {
    let h = harness();
    let first = h.registry.resolve(&housing_request()).await;
    let second = h.registry.resolve(&housing_request()).await;

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.data, second.data);
}

#[tokio::test]
async fn test_validation_error_makes_no_store_calls() {
    let h = harness();
    h.store.reset_call_count();

    let requests = [
        DataRefRequest::new("housing_allowance").code("AB123"),
        DataRefRequest::new("housing_allowance").paygrade("E05"),
        DataRefRequest::new("subsistence_allowance"),
        DataRefRequest::new("cost_of_living_adjustment").paygrade("E05"),
        DataRefRequest::new("tax_retirement_limits"),
        DataRefRequest::new("health_plan_costs").year(2025),
    ];
    for request in &requests {
        let result = h.registry.resolve(request).await;
        assert!(result.data.is_none());
        assert!(result.error.unwrap().contains("is required for"));
    }

    assert_eq!(h.store.call_count(), 0);
}

#[tokio::test]
async fn test_clock_past_expiry_refetches() {
    let h = harness();
    h.registry.resolve(&housing_request()).await;

    h.clock.advance(Duration::seconds(86_400 - 1));
    assert!(h.registry.resolve(&housing_request()).await.cached);

    h.clock.advance(Duration::seconds(1));
    h.store.reset_call_count();
    let result = h.registry.resolve(&housing_request()).await;
    assert!(!result.cached);
    assert!(result.is_found());
    // cache read, provider query, cache write
    assert_eq!(h.store.call_count(), 3);
}

#[tokio::test]
async fn test_invalidate_pattern_forces_fetch() {
    let h = harness();
    h.registry.resolve(&housing_request()).await;

    let cache = h.registry.cache().unwrap();
    let purged = cache
        .invalidate_pattern(&source_prefix(SourceKey::HousingAllowance))
        .await
        .unwrap();
    assert_eq!(purged, 1);

    assert!(!h.registry.resolve(&housing_request()).await.cached);
}

#[tokio::test]
async fn test_refresh_forces_fetch() {
    let h = harness();
    h.registry.resolve(&DataRefRequest::new("mileage")).await;

    let report = h
        .registry
        .cache()
        .unwrap()
        .refresh_source_data(SourceKey::MileageRate)
        .await;
    assert!(report.is_ok());
    assert_eq!(report.purged, 1);

    assert!(!h.registry.resolve(&DataRefRequest::new("mileage")).await.cached);
}

#[tokio::test]
async fn test_not_found_is_not_cached() {
    let h = harness();
    let request = DataRefRequest::new("bah").paygrade("E06").code("AB123");

    let first = h.registry.resolve(&request).await;
    assert!(first.data.is_none());
    assert!(first.error.is_some());
    assert_eq!(h.store.stats().cache_entries, 0);

    let second = h.registry.resolve(&request).await;
    assert!(!second.cached);
}

#[tokio::test]
async fn test_unknown_source() {
    let h = harness();
    let result = h.registry.resolve(&DataRefRequest::new("weather")).await;
    assert!(result.data.is_none());
    assert_eq!(result.error.as_deref(), Some("Unknown source: weather"));
}

#[tokio::test]
async fn test_batch_isolates_failures_and_keeps_order() {
    let h = harness();
    h.store.fail_operation(StoreOperation::MileageRates);

    let results = h
        .registry
        .resolve_batch(&[
            housing_request(),
            DataRefRequest::new("mileage"),
            DataRefRequest::new("cola").code("GE001").paygrade("E05").with_dependents(true),
            DataRefRequest::new("nonsense"),
            DataRefRequest::new("irs_limits").field("Elective Deferral").year(2025),
        ])
        .await;

    assert_eq!(results.len(), 5);
    assert_eq!(results[0].data.as_ref().unwrap().display_value, "$2,450.00");
    assert!(results[1].data.is_none());
    assert!(results[1].error.as_ref().unwrap().starts_with("Store error:"));
    assert_eq!(results[2].data.as_ref().unwrap().display_value, "$380.00");
    assert_eq!(results[3].error.as_deref(), Some("Unknown source: nonsense"));
    assert_eq!(results[4].data.as_ref().unwrap().display_value, "$23,500.00");
}

/// Rate store whose COLA tables are unreachable.
struct ColaOutage(Arc<MemoryStore>);

#[async_trait]
impl RateStore for ColaOutage {
    async fn latest_housing_rate(
        &self,
        paygrade: &str,
        location_code: &str,
        with_dependents: bool,
        as_of: NaiveDate,
    ) -> Result<Option<HousingRateRow>> {
        self.0
            .latest_housing_rate(paygrade, location_code, with_dependents, as_of)
            .await
    }

    async fn latest_cola_rate(
        &self,
        _scope: ColaScope,
        _location_code: &str,
        _paygrade: &str,
        _with_dependents: bool,
        _as_of: NaiveDate,
    ) -> Result<Option<ColaRateRow>> {
        Err(RefDataError::Store("connection reset".into()))
    }

    async fn reference_value(
        &self,
        category: ReferenceCategory,
        field: &str,
        year: i32,
    ) -> Result<Option<ReferenceValueRow>> {
        self.0.reference_value(category, field, year).await
    }

    async fn latest_mileage_rate(
        &self,
        year: i32,
        as_of: NaiveDate,
    ) -> Result<Option<MileageRateRow>> {
        self.0.latest_mileage_rate(year, as_of).await
    }
}

#[tokio::test]
async fn test_batch_with_failing_provider_in_middle() {
    let store = Arc::new(MemoryStore::from_snapshot(snapshot()).unwrap());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
    ));
    let registry = DataRefRegistry::new(
        Arc::new(ColaOutage(store.clone())),
        store,
        clock,
        EngineConfig::default(),
    );

    let results = registry
        .resolve_batch(&[
            housing_request(),
            DataRefRequest::new("cola").code("GE001").paygrade("E05"),
            DataRefRequest::new("mileage"),
        ])
        .await;

    assert!(results[0].is_found());
    assert_eq!(
        results[1].error.as_deref(),
        Some("Store error: connection reset")
    );
    assert!(results[2].is_found());
}

#[tokio::test]
async fn test_reimbursement_hundred_miles() {
    let h = harness();
    let r = h.registry.calculate_reimbursement(100.0, None).await.unwrap();
    assert_eq!(r.total_cents, 6_700);
    assert_eq!(r.display_value, "$67.00");
}

#[tokio::test]
async fn test_money_display_round_trip() {
    let h = harness();
    let data = h.registry.resolve(&housing_request()).await.data.unwrap();

    assert_eq!(parse_money_cents(&data.display_value), Some(data.value as i64));
    assert_eq!(format_money_cents(data.value as i64), data.display_value);
}

#[tokio::test]
async fn test_cache_store_outage_degrades_to_fetch() {
    let h = harness();
    h.store.fail_operation(StoreOperation::CacheRead);
    h.store.fail_operation(StoreOperation::CacheWrite);

    let first = h.registry.resolve(&housing_request()).await;
    let second = h.registry.resolve(&housing_request()).await;
    assert!(first.is_found() && second.is_found());
    assert!(!second.cached);
}

#[tokio::test]
async fn test_health_summary_passthrough() {
    let h = harness();
    let summary = h.registry.health_cost_summary(Some(2025)).await;
    assert_eq!(summary.len(), 4);
    assert!(summary.iter().all(|(_, r)| r.data.is_none() && r.error.is_some()));
}
