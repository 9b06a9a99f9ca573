//! Standard mileage rate provider and reimbursement calculation.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, instrument};

use refdata_core::clock::Clock;
use refdata_core::constants::CURRENCY_USD;
use refdata_core::error::{RefDataError, Result};
use refdata_core::format::format_money_cents;
use refdata_core::provenance::provenance_for;
use refdata_core::traits::RateStore;
use refdata_core::types::{DataFormat, MileageQuery, ResolvedData, SourceKey};

use crate::Provider;

/// Outcome of a reimbursement calculation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reimbursement {
    /// Miles driven
    pub miles: f64,
    /// Dollars per mile applied
    pub rate_per_mile: f64,
    /// Total, rounded to the nearest cent (half away from zero)
    pub total_cents: i64,
    /// Total formatted as currency
    pub display_value: String,
    /// Effective date of the rate applied
    pub as_of: NaiveDate,
}

/// Single global per-mile rate per year.
pub struct MileageRateProvider {
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
}

impl MileageRateProvider {
    /// Creates a provider over the given store.
    pub fn new(store: Arc<dyn RateStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Multiplies `miles` by the year's rate.
    #[instrument(skip(self))]
    pub async fn calculate_reimbursement(
        &self,
        miles: f64,
        year: Option<i32>,
    ) -> Result<Reimbursement> {
        if !miles.is_finite() || miles < 0.0 {
            return Err(RefDataError::Validation(
                "miles must be a non-negative number".into(),
            ));
        }

        let rate = self.lookup(&MileageQuery { year, as_of: None }).await?;
        let total_cents = reimbursement_cents(miles, rate.value)?;
        debug!(total_cents, "Reimbursement calculated");

        Ok(Reimbursement {
            miles,
            rate_per_mile: rate.value,
            total_cents,
            display_value: format_money_cents(total_cents),
            as_of: rate.as_of,
        })
    }
}

fn to_decimal(value: f64, what: &str) -> Result<Decimal> {
    Decimal::from_str(&value.to_string())
        .map_err(|e| RefDataError::Validation(format!("{what} {value} out of range: {e}")))
}

/// `miles × rate` in cents, rounded half away from zero.
fn reimbursement_cents(miles: f64, rate_per_mile: f64) -> Result<i64> {
    let total = to_decimal(miles, "miles")?
        .checked_mul(to_decimal(rate_per_mile, "rate")?)
        .and_then(|dollars| dollars.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| {
            RefDataError::Validation(format!(
                "reimbursement for {miles} miles at {rate_per_mile} is out of range"
            ))
        })?;
    total
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| RefDataError::Validation(format!("reimbursement {total} out of range")))
}

#[async_trait]
impl Provider for MileageRateProvider {
    type Params = MileageQuery;

    fn source(&self) -> SourceKey {
        SourceKey::MileageRate
    }

    #[instrument(skip(self), fields(source = "mileage_rate"))]
    async fn lookup(&self, query: &MileageQuery) -> Result<ResolvedData> {
        let as_of = query.as_of.unwrap_or_else(|| self.clock.today());
        let year = query.year.unwrap_or_else(|| as_of.year());

        let row = self
            .store
            .latest_mileage_rate(year, as_of)
            .await?
            .ok_or_else(|| {
                RefDataError::NotFound(format!("No mileage rate for {year} as of {as_of}"))
            })?;

        let provenance = provenance_for(SourceKey::MileageRate);
        Ok(ResolvedData::new(
            row.rate_per_mile,
            DataFormat::Rate,
            row.effective_date,
            provenance.source_name,
        )
        .with_currency(CURRENCY_USD)
        .with_source_url(
            row.source_url
                .or_else(|| Some(provenance.source_url.to_string())),
        ))
    }
}
