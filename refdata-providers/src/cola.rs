//! Cost-of-living adjustment provider.
//!
//! A location code lives in exactly one of the domestic or overseas tables,
//! so without an explicit scope both are probed in that order and the first
//! hit wins.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use refdata_core::clock::Clock;
use refdata_core::constants::CURRENCY_USD;
use refdata_core::error::{RefDataError, Result};
use refdata_core::normalize::{normalize_code, normalize_paygrade};
use refdata_core::provenance::provenance_for;
use refdata_core::traits::RateStore;
use refdata_core::types::{ColaQuery, ColaScope, DataFormat, ResolvedData, SourceKey};

use crate::Provider;

const PROBE_ORDER: [ColaScope; 2] = [ColaScope::Domestic, ColaScope::Overseas];

/// Cost-of-living adjustment by location, paygrade, and dependency status.
pub struct CostOfLivingProvider {
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
}

impl CostOfLivingProvider {
    /// Creates a provider over the given store.
    pub fn new(store: Arc<dyn RateStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl Provider for CostOfLivingProvider {
    type Params = ColaQuery;

    fn source(&self) -> SourceKey {
        SourceKey::CostOfLivingAdjustment
    }

    #[instrument(skip(self), fields(source = "cost_of_living_adjustment"))]
    async fn lookup(&self, query: &ColaQuery) -> Result<ResolvedData> {
        let code = normalize_code(&query.location_code);
        let paygrade = normalize_paygrade(&query.paygrade);
        let as_of = query.as_of.unwrap_or_else(|| self.clock.today());

        let scopes: &[ColaScope] = match &query.scope {
            Some(scope) => std::slice::from_ref(scope),
            None => &PROBE_ORDER,
        };

        for scope in scopes {
            let row = self
                .store
                .latest_cola_rate(*scope, &code, &paygrade, query.with_dependents, as_of)
                .await?;

            if let Some(row) = row {
                debug!(scope = scope.as_str(), "COLA row found");
                let provenance = provenance_for(SourceKey::CostOfLivingAdjustment);
                let mut data = ResolvedData::new(
                    row.value,
                    row.format,
                    row.effective_date,
                    provenance.source_name,
                )
                .with_source_url(Some(provenance.source_url.to_string()));
                if row.format == DataFormat::Money {
                    data = data.with_currency(CURRENCY_USD);
                }
                return Ok(data);
            }
        }

        Err(RefDataError::NotFound(format!(
            "No cost-of-living adjustment for {paygrade} at {code} as of {as_of}"
        )))
    }
}
