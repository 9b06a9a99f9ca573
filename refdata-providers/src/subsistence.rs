//! Subsistence allowance provider.
//!
//! Two flat monthly rates, officer and enlisted, taken from configuration
//! rather than a table. No date filter applies.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use refdata_core::constants::{
    CURRENCY_USD, DEFAULT_BAS_ENLISTED_CENTS, DEFAULT_BAS_LAST_UPDATED, DEFAULT_BAS_OFFICER_CENTS,
};
use refdata_core::error::{RefDataError, Result};
use refdata_core::normalize::{is_officer_grade, normalize_paygrade};
use refdata_core::provenance::provenance_for;
use refdata_core::types::{DataFormat, ResolvedData, SourceKey, SubsistenceQuery};

use crate::Provider;

/// Configured subsistence rates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsistenceRates {
    /// Enlisted monthly rate in cents
    pub enlisted_cents: i64,
    /// Officer monthly rate in cents
    pub officer_cents: i64,
    /// Date the rates were published
    pub last_updated: NaiveDate,
}

impl Default for SubsistenceRates {
    fn default() -> Self {
        Self {
            enlisted_cents: DEFAULT_BAS_ENLISTED_CENTS,
            officer_cents: DEFAULT_BAS_OFFICER_CENTS,
            last_updated: DEFAULT_BAS_LAST_UPDATED.parse().unwrap_or_default(),
        }
    }
}

/// Officer/enlisted subsistence allowance.
pub struct SubsistenceAllowanceProvider {
    rates: SubsistenceRates,
}

impl SubsistenceAllowanceProvider {
    /// Creates a provider with the given rates.
    pub fn new(rates: SubsistenceRates) -> Self {
        Self { rates }
    }

    /// Returns the configured rates.
    pub fn rates(&self) -> &SubsistenceRates {
        &self.rates
    }
}

impl Default for SubsistenceAllowanceProvider {
    fn default() -> Self {
        Self::new(SubsistenceRates::default())
    }
}

#[async_trait]
impl Provider for SubsistenceAllowanceProvider {
    type Params = SubsistenceQuery;

    fn source(&self) -> SourceKey {
        SourceKey::SubsistenceAllowance
    }

    #[instrument(skip(self), fields(source = "subsistence_allowance"))]
    async fn lookup(&self, query: &SubsistenceQuery) -> Result<ResolvedData> {
        let cents = match is_officer_grade(&query.paygrade) {
            Some(true) => self.rates.officer_cents,
            Some(false) => self.rates.enlisted_cents,
            None => {
                return Err(RefDataError::NotFound(format!(
                    "No subsistence allowance rate for paygrade {}",
                    normalize_paygrade(&query.paygrade)
                )))
            }
        };

        let provenance = provenance_for(SourceKey::SubsistenceAllowance);
        Ok(ResolvedData::new(
            cents as f64,
            DataFormat::Money,
            self.rates.last_updated,
            provenance.source_name,
        )
        .with_currency(CURRENCY_USD)
        .with_source_url(Some(provenance.source_url.to_string())))
    }
}
