//! Health plan costs, with a grouped summary lookup.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::instrument;

use refdata_core::clock::Clock;
use refdata_core::constants::HEALTH_COST_SUMMARY_FIELDS;
use refdata_core::error::Result;
use refdata_core::traits::RateStore;
use refdata_core::types::{
    HealthCostQuery, ProviderResult, ReferenceCategory, ResolvedData, SourceKey,
};

use crate::{Provider, ReferenceLookup};

/// Annual health plan enrollment fees, deductibles, and caps.
pub struct HealthCostsProvider {
    table: ReferenceLookup,
}

impl HealthCostsProvider {
    /// Creates a provider over the given store.
    pub fn new(store: Arc<dyn RateStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: ReferenceLookup::new(store, clock, ReferenceCategory::HealthPlanCosts),
        }
    }

    /// Fetches the summary group concurrently.
    ///
    /// Results come back in [`HEALTH_COST_SUMMARY_FIELDS`] order; a missing
    /// field is a data-less entry and never fails the group.
    #[instrument(skip(self))]
    pub async fn fetch_summary(&self, year: Option<i32>) -> Vec<(&'static str, ProviderResult)> {
        let year = Some(year.unwrap_or_else(|| self.table.default_year()));
        let lookups = HEALTH_COST_SUMMARY_FIELDS.into_iter().map(|field| async move {
            let query = HealthCostQuery {
                field: field.to_string(),
                year,
            };
            (field, self.fetch(&query).await)
        });
        join_all(lookups).await
    }
}

#[async_trait]
impl Provider for HealthCostsProvider {
    type Params = HealthCostQuery;

    fn source(&self) -> SourceKey {
        SourceKey::HealthPlanCosts
    }

    async fn lookup(&self, query: &HealthCostQuery) -> Result<ResolvedData> {
        self.table.lookup(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use refdata_core::clock::ManualClock;
    use refdata_core::types::{DataFormat, ReferenceValueRow};
    use refdata_store::MemoryStore;

    fn setup(fields: &[&str]) -> HealthCostsProvider {
        let store = Arc::new(MemoryStore::new());
        for (i, field) in fields.iter().enumerate() {
            store
                .insert_reference_value(ReferenceValueRow {
                    category: ReferenceCategory::HealthPlanCosts,
                    field: (*field).into(),
                    year: 2025,
                    value: (i as f64 + 1.0) * 10_000.0,
                    format: DataFormat::Money,
                    unit: Some("USD".into()),
                    source_name: "TRICARE".into(),
                    source_url: Some("https://www.tricare.mil/Costs".into()),
                    as_of: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                })
                .unwrap();
        }
        let clock = Arc::new(ManualClock::new(
            NaiveDate::from_ymd_opt(2025, 2, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc(),
        ));
        HealthCostsProvider::new(store, clock)
    }

    #[tokio::test]
    async fn test_single_field() {
        let provider = setup(&["prime_enrollment_individual"]);
        let data = provider
            .fetch(&HealthCostQuery {
                field: "Prime Enrollment Individual".into(),
                year: Some(2025),
            })
            .await
            .data
            .unwrap();
        assert_eq!(data.display_value, "$100.00");
        assert_eq!(data.source_name, "TRICARE");
    }

    #[tokio::test]
    async fn test_summary_preserves_group_order() {
        let provider = setup(&HEALTH_COST_SUMMARY_FIELDS);
        let summary = provider.fetch_summary(None).await;

        let fields: Vec<&str> = summary.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, HEALTH_COST_SUMMARY_FIELDS.to_vec());
        assert!(summary.iter().all(|(_, r)| r.is_found()));
        assert_eq!(summary[1].1.data.as_ref().unwrap().value, 20_000.0);
    }

    #[tokio::test]
    async fn test_summary_partial() {
        let provider = setup(&["prime_enrollment_individual"]);
        let summary = provider.fetch_summary(Some(2025)).await;

        assert_eq!(summary.len(), HEALTH_COST_SUMMARY_FIELDS.len());
        assert!(summary[0].1.is_found());
        assert!(summary[1..].iter().all(|(_, r)| r.error.is_some()));
    }
}
