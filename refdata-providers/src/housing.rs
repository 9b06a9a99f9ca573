//! Housing allowance provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use refdata_core::clock::Clock;
use refdata_core::constants::CURRENCY_USD;
use refdata_core::error::{RefDataError, Result};
use refdata_core::normalize::{normalize_code, normalize_paygrade};
use refdata_core::provenance::provenance_for;
use refdata_core::traits::RateStore;
use refdata_core::types::{DataFormat, HousingQuery, ResolvedData, SourceKey};

use crate::Provider;

/// Monthly housing allowance by paygrade, area, and dependency status.
pub struct HousingAllowanceProvider {
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
}

impl HousingAllowanceProvider {
    /// Creates a provider over the given store.
    pub fn new(store: Arc<dyn RateStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl Provider for HousingAllowanceProvider {
    type Params = HousingQuery;

    fn source(&self) -> SourceKey {
        SourceKey::HousingAllowance
    }

    #[instrument(skip(self), fields(source = "housing_allowance"))]
    async fn lookup(&self, query: &HousingQuery) -> Result<ResolvedData> {
        let paygrade = normalize_paygrade(&query.paygrade);
        let code = normalize_code(&query.location_code);
        let as_of = query.as_of.unwrap_or_else(|| self.clock.today());

        let row = self
            .store
            .latest_housing_rate(&paygrade, &code, query.with_dependents, as_of)
            .await?
            .ok_or_else(|| {
                RefDataError::NotFound(format!(
                    "No housing allowance rate for {paygrade} at {code} {} dependents as of {as_of}",
                    if query.with_dependents { "with" } else { "without" },
                ))
            })?;

        let provenance = provenance_for(SourceKey::HousingAllowance);
        Ok(
            ResolvedData::new(
                row.rate_cents as f64,
                DataFormat::Money,
                row.effective_date,
                provenance.source_name,
            )
            .with_currency(CURRENCY_USD)
            .with_source_url(Some(provenance.source_url.to_string())),
        )
    }
}
