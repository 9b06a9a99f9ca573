//! Tax and retirement contribution limits.

use std::sync::Arc;

use async_trait::async_trait;

use refdata_core::clock::Clock;
use refdata_core::error::Result;
use refdata_core::traits::RateStore;
use refdata_core::types::{ReferenceCategory, ResolvedData, SourceKey, TaxLimitQuery};

use crate::{Provider, ReferenceLookup};

/// Annual tax and retirement limits by field name.
pub struct TaxLimitsProvider {
    table: ReferenceLookup,
}

impl TaxLimitsProvider {
    /// Creates a provider over the given store.
    pub fn new(store: Arc<dyn RateStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: ReferenceLookup::new(store, clock, ReferenceCategory::TaxRetirementLimits),
        }
    }
}

#[async_trait]
impl Provider for TaxLimitsProvider {
    type Params = TaxLimitQuery;

    fn source(&self) -> SourceKey {
        SourceKey::TaxRetirementLimits
    }

    async fn lookup(&self, query: &TaxLimitQuery) -> Result<ResolvedData> {
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

    fn setup() -> TaxLimitsProvider {
        let store = Arc::new(MemoryStore::new());
        for (year, cents) in [(2024, 2_300_000.0), (2025, 2_350_000.0)] {
            store
                .insert_reference_value(ReferenceValueRow {
                    category: ReferenceCategory::TaxRetirementLimits,
                    field: "elective_deferral".into(),
                    year,
                    value: cents,
                    format: DataFormat::Money,
                    unit: None,
                    source_name: "Internal Revenue Service".into(),
                    source_url: Some("https://www.irs.gov/newsroom".into()),
                    as_of: NaiveDate::from_ymd_opt(year - 1, 11, 1).unwrap(),
                })
                .unwrap();
        }
        let clock = Arc::new(ManualClock::new(
            NaiveDate::from_ymd_opt(2025, 4, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc(),
        ));
        TaxLimitsProvider::new(store, clock)
    }

    #[tokio::test]
    async fn test_defaults_to_current_year() {
        let provider = setup();
        let data = provider
            .fetch(&TaxLimitQuery {
                field: "Elective Deferral".into(),
                year: None,
            })
            .await
            .data
            .unwrap();

        assert_eq!(data.display_value, "$23,500.00");
        assert_eq!(data.currency.as_deref(), Some("USD"));
        assert_eq!(data.source_url.as_deref(), Some("https://www.irs.gov/newsroom"));
    }

    #[tokio::test]
    async fn test_explicit_year() {
        let provider = setup();
        let data = provider
            .fetch(&TaxLimitQuery {
                field: "elective_deferral".into(),
                year: Some(2024),
            })
            .await
            .data
            .unwrap();
        assert_eq!(data.value, 2_300_000.0);
        assert_eq!(data.as_of, NaiveDate::from_ymd_opt(2023, 11, 1).unwrap());
    }

    #[tokio::test]
    async fn test_missing_year_not_found() {
        let provider = setup();
        let result = provider
            .fetch(&TaxLimitQuery {
                field: "elective_deferral".into(),
                year: Some(2020),
            })
            .await;
        assert_eq!(
            result.error.as_deref(),
            Some("No tax/retirement limit value for elective_deferral in 2020")
        );
    }
}
