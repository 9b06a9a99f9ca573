//! Composite-key lookup against the key/value reference table.
//!
//! Tax limits and health plan costs share this table, partitioned by
//! category. Provenance is read from the row rather than hardcoded.

use std::sync::Arc;

use chrono::Datelike;
use tracing::instrument;

use refdata_core::clock::Clock;
use refdata_core::constants::CURRENCY_USD;
use refdata_core::error::{RefDataError, Result};
use refdata_core::normalize::normalize_field;
use refdata_core::traits::RateStore;
use refdata_core::types::{DataFormat, ReferenceCategory, ReferenceQuery, ResolvedData};

/// Field + year lookup in one category of the reference table.
pub struct ReferenceLookup {
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
    category: ReferenceCategory,
}

impl ReferenceLookup {
    /// Creates a lookup bound to one category.
    pub fn new(store: Arc<dyn RateStore>, clock: Arc<dyn Clock>, category: ReferenceCategory) -> Self {
        Self {
            store,
            clock,
            category,
        }
    }

    /// The year used when a query names none.
    pub fn default_year(&self) -> i32 {
        self.clock.today().year()
    }

    /// Looks up `field` for the query year.
    #[instrument(skip(self), fields(category = ?self.category))]
    pub async fn lookup(&self, query: &ReferenceQuery) -> Result<ResolvedData> {
        let field = normalize_field(&query.field);
        let year = query.year.unwrap_or_else(|| self.default_year());

        let row = self
            .store
            .reference_value(self.category, &field, year)
            .await?
            .ok_or_else(|| {
                RefDataError::NotFound(format!(
                    "No {} value for {field} in {year}",
                    category_label(self.category)
                ))
            })?;

        let mut data = ResolvedData::new(row.value, row.format, row.as_of, row.source_name)
            .with_source_url(row.source_url);
        if row.format == DataFormat::Money {
            data = data.with_currency(row.unit.unwrap_or_else(|| CURRENCY_USD.to_string()));
        }
        Ok(data)
    }
}

fn category_label(category: ReferenceCategory) -> &'static str {
    match category {
        ReferenceCategory::TaxRetirementLimits => "tax/retirement limit",
        ReferenceCategory::HealthPlanCosts => "health plan cost",
    }
}
