//! Validated, strongly-typed queries, one record per source.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ColaScope, SourceKey};

/// Housing allowance lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingQuery {
    /// Paygrade
    pub paygrade: String,
    /// Housing area code
    pub location_code: String,
    /// Dependency status
    pub with_dependents: bool,
    /// Effective date (defaults to today)
    pub as_of: Option<NaiveDate>,
}

/// Subsistence allowance lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsistenceQuery {
    /// Paygrade; only the officer/enlisted distinction matters
    pub paygrade: String,
}

/// Cost-of-living adjustment lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColaQuery {
    /// COLA location code
    pub location_code: String,
    /// Paygrade
    pub paygrade: String,
    /// Dependency status
    pub with_dependents: bool,
    /// Restricts the probe to one table; both are probed when absent
    pub scope: Option<ColaScope>,
    /// Effective date (defaults to today)
    pub as_of: Option<NaiveDate>,
}

/// Composite-key (field + year) lookup against the reference table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceQuery {
    /// Field name
    pub field: String,
    /// Publication year (defaults to the current year)
    pub year: Option<i32>,
}

/// Tax and retirement limit lookup.
pub type TaxLimitQuery = ReferenceQuery;

/// Health plan cost lookup.
pub type HealthCostQuery = ReferenceQuery;

/// Mileage rate lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileageQuery {
    /// Rate year (defaults to the as-of year)
    pub year: Option<i32>,
    /// Effective date for mid-year revisions (defaults to today)
    pub as_of: Option<NaiveDate>,
}

/// A validated request, tagged by source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DataQuery {
    /// Housing allowance
    HousingAllowance(HousingQuery),
    /// Subsistence allowance
    SubsistenceAllowance(SubsistenceQuery),
    /// Cost-of-living adjustment
    CostOfLivingAdjustment(ColaQuery),
    /// Tax and retirement limits
    TaxRetirementLimits(TaxLimitQuery),
    /// Health plan costs
    HealthPlanCosts(HealthCostQuery),
    /// Mileage rate
    MileageRate(MileageQuery),
}

impl DataQuery {
    /// The source this query is routed to.
    pub fn source_key(&self) -> SourceKey {
        match self {
            DataQuery::HousingAllowance(_) => SourceKey::HousingAllowance,
            DataQuery::SubsistenceAllowance(_) => SourceKey::SubsistenceAllowance,
            DataQuery::CostOfLivingAdjustment(_) => SourceKey::CostOfLivingAdjustment,
            DataQuery::TaxRetirementLimits(_) => SourceKey::TaxRetirementLimits,
            DataQuery::HealthPlanCosts(_) => SourceKey::HealthPlanCosts,
            DataQuery::MileageRate(_) => SourceKey::MileageRate,
        }
    }
}
