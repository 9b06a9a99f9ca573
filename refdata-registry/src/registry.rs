//! Request orchestration.

use std::sync::Arc;

use chrono::Datelike;
use futures::future::join_all;
use tracing::{debug, instrument, warn};

use refdata_cache::{generate_cache_key, Cached, CacheKeyParams, RefDataCache};
use refdata_core::clock::Clock;
use refdata_core::error::Result;
use refdata_core::provenance::{provenance_for, Provenance};
use refdata_core::traits::{CacheStore, RateStore};
use refdata_core::types::{DataQuery, DataRefRequest, ProviderResult, ResolvedData, SourceKey};
use refdata_providers::{
    CostOfLivingProvider, HealthCostsProvider, HousingAllowanceProvider, MileageRateProvider,
    Provider, Reimbursement, SubsistenceAllowanceProvider, TaxLimitsProvider,
};

use crate::validate::validate;
use crate::EngineConfig;

/// Resolves reference-data requests.
///
/// Flow per request:
/// 1. Validate against the required-field table (no I/O on failure)
/// 2. Look up through the cache, dispatching to the source's provider on a miss
/// 3. Re-render the display string if the request overrides the format
///
/// Nothing here returns an error to the caller; every failure becomes a
/// data-less [`ProviderResult`].
pub struct DataRefRegistry {
    housing: HousingAllowanceProvider,
    subsistence: SubsistenceAllowanceProvider,
    cola: CostOfLivingProvider,
    tax_limits: TaxLimitsProvider,
    health_costs: HealthCostsProvider,
    mileage: MileageRateProvider,
    cache: Option<Arc<RefDataCache>>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl DataRefRegistry {
    /// Creates a registry over separate rate and cache stores.
    pub fn new(
        rates: Arc<dyn RateStore>,
        cache_store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let cache = config
            .enable_cache
            .then(|| Arc::new(RefDataCache::new(cache_store, clock.clone())));

        Self {
            housing: HousingAllowanceProvider::new(rates.clone(), clock.clone()),
            subsistence: SubsistenceAllowanceProvider::new(config.subsistence.clone()),
            cola: CostOfLivingProvider::new(rates.clone(), clock.clone()),
            tax_limits: TaxLimitsProvider::new(rates.clone(), clock.clone()),
            health_costs: HealthCostsProvider::new(rates.clone(), clock.clone()),
            mileage: MileageRateProvider::new(rates, clock.clone()),
            cache,
            clock,
            config,
        }
    }

    /// Creates a registry over one store serving both roles.
    pub fn from_store<S>(store: Arc<S>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self
    where
        S: RateStore + CacheStore + 'static,
    {
        Self::new(store.clone(), store, clock, config)
    }

    /// The cache, when enabled.
    pub fn cache(&self) -> Option<&Arc<RefDataCache>> {
        self.cache.as_ref()
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolves one request.
    #[instrument(skip(self), fields(source = %request.source))]
    pub async fn resolve(&self, request: &DataRefRequest) -> ProviderResult {
        let validated = match validate(request) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Request rejected");
                return ProviderResult::from_error(&e);
            }
        };

        let mut result = self.resolve_query(&validated.query).await;
        if let Some((format, unit)) = validated.display {
            result.data = result.data.map(|data| data.reformatted(format, unit));
        }
        result
    }

    /// Resolves an already-typed query in its native format.
    pub async fn resolve_query(&self, query: &DataQuery) -> ProviderResult {
        match self.lookup(query).await {
            Ok(cached) => ProviderResult::found(cached.data).with_cached(cached.from_cache),
            Err(e) => {
                warn!(source = %query.source_key(), error = %e, "Resolution failed");
                ProviderResult::from_error(&e)
            }
        }
    }

    /// Resolves every request concurrently.
    ///
    /// Results are in request order; one failure never affects the others.
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn resolve_batch(&self, requests: &[DataRefRequest]) -> Vec<ProviderResult> {
        join_all(requests.iter().map(|request| self.resolve(request))).await
    }

    /// Mileage reimbursement for `miles` at the year's rate.
    pub async fn calculate_reimbursement(
        &self,
        miles: f64,
        year: Option<i32>,
    ) -> Result<Reimbursement> {
        self.mileage.calculate_reimbursement(miles, year).await
    }

    /// The health plan cost summary group for `year`.
    pub async fn health_cost_summary(&self, year: Option<i32>) -> Vec<(&'static str, ProviderResult)> {
        self.health_costs.fetch_summary(year).await
    }

    /// Attribution for a source.
    pub fn provenance_for(&self, source: SourceKey) -> Provenance {
        provenance_for(source)
    }

    async fn lookup(&self, query: &DataQuery) -> Result<Cached<ResolvedData>> {
        let query = &self.pin_defaults(query.clone());
        let Some(cache) = &self.cache else {
            return Ok(Cached {
                data: self.dispatch(query).await?,
                from_cache: false,
            });
        };

        let key = generate_cache_key(&CacheKeyParams::from(query));
        let ttl = self.config.ttl_for(query.source_key());
        cache.get_cached(&key, ttl, || self.dispatch(query)).await
    }

    /// Fills clock-derived defaults so the cache key names the year (and
    /// mileage date) actually served.
    fn pin_defaults(&self, mut query: DataQuery) -> DataQuery {
        let today = self.clock.today();
        match &mut query {
            DataQuery::TaxRetirementLimits(q) | DataQuery::HealthPlanCosts(q) => {
                q.year.get_or_insert(today.year());
            }
            DataQuery::MileageRate(q) => {
                let as_of = *q.as_of.get_or_insert(today);
                q.year.get_or_insert(as_of.year());
            }
            _ => {}
        }
        query
    }

    async fn dispatch(&self, query: &DataQuery) -> Result<ResolvedData> {
        debug!(source = %query.source_key(), "Dispatching to provider");
        match query {
            DataQuery::HousingAllowance(q) => self.housing.lookup(q).await,
            DataQuery::SubsistenceAllowance(q) => self.subsistence.lookup(q).await,
            DataQuery::CostOfLivingAdjustment(q) => self.cola.lookup(q).await,
            DataQuery::TaxRetirementLimits(q) => self.tax_limits.lookup(q).await,
            DataQuery::HealthPlanCosts(q) => self.health_costs.lookup(q).await,
            DataQuery::MileageRate(q) => self.mileage.lookup(q).await,
        }
    }
}
