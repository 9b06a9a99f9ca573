//! Row records for the versioned backing tables.
//!
//! These are written by external scrapers; this workspace only reads them
//! (plus [`StoreSnapshot`] import for seeding a store).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CacheEntry, ColaScope, DataFormat, FeedStatus, ReferenceCategory};

/// Housing allowance row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HousingRateRow {
    /// Paygrade, e.g. `E05`
    pub paygrade: String,
    /// Housing area code
    pub location_code: String,
    /// Dependency status
    pub with_dependents: bool,
    /// Monthly rate in cents
    pub rate_cents: i64,
    /// Date the rate took effect
    pub effective_date: NaiveDate,
}

/// Cost-of-living adjustment row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColaRateRow {
    /// Table the location belongs to
    pub scope: ColaScope,
    /// COLA location code
    pub location_code: String,
    /// Paygrade
    pub paygrade: String,
    /// Dependency status
    pub with_dependents: bool,
    /// Value, denominated per `format`
    pub value: f64,
    /// Denomination of `value`
    pub format: DataFormat,
    /// Date the value took effect
    pub effective_date: NaiveDate,
}

/// Generic key/value reference row with provenance stored alongside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceValueRow {
    /// Table partition
    pub category: ReferenceCategory,
    /// Field name
    pub field: String,
    /// Publication year
    pub year: i32,
    /// Value, denominated per `format`
    pub value: f64,
    /// Denomination of `value`
    pub format: DataFormat,
    /// Currency unit for money values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Publishing authority
    pub source_name: String,
    /// Where the value is published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Publication date
    pub as_of: NaiveDate,
}

/// Per-mile reimbursement rate row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MileageRateRow {
    /// Rate year
    pub year: i32,
    /// Dollars per mile
    pub rate_per_mile: f64,
    /// Date the rate took effect (mid-year revisions share a year)
    pub effective_date: NaiveDate,
    /// Where the rate is published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// Full contents of a store, used for persistence and seeding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Housing allowance table
    #[serde(default)]
    pub housing_rates: Vec<HousingRateRow>,
    /// Cost-of-living tables
    #[serde(default)]
    pub cola_rates: Vec<ColaRateRow>,
    /// Key/value reference table
    #[serde(default)]
    pub reference_values: Vec<ReferenceValueRow>,
    /// Mileage rate table
    #[serde(default)]
    pub mileage_rates: Vec<MileageRateRow>,
    /// Persisted cache entries by key
    #[serde(default)]
    pub cache_entries: BTreeMap<String, CacheEntry<serde_json::Value>>,
    /// Feed bookkeeping rows
    #[serde(default)]
    pub feeds: Vec<FeedStatus>,
}

impl StoreSnapshot {
    /// Number of backing-table rows (cache and feed rows excluded).
    pub fn row_count(&self) -> usize {
        self.housing_rates.len()
            + self.cola_rates.len()
            + self.reference_values.len()
            + self.mileage_rates.len()
    }
}
