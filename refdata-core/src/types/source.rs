//! Source keys and the small closed enums shared across the workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    COLA_TTL_SECONDS, HEALTH_COSTS_TTL_SECONDS, HOUSING_TTL_SECONDS, MILEAGE_TTL_SECONDS,
    SUBSISTENCE_TTL_SECONDS, TAX_LIMITS_TTL_SECONDS,
};
use crate::error::RefDataError;

/// Reference-data domain a request is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKey {
    /// Monthly housing allowance by paygrade, location, and dependency status
    HousingAllowance,
    /// Monthly subsistence allowance (officer/enlisted)
    SubsistenceAllowance,
    /// Cost-of-living adjustment, domestic or overseas
    CostOfLivingAdjustment,
    /// Annual tax and retirement contribution limits
    TaxRetirementLimits,
    /// Annual health plan enrollment fees, deductibles, and caps
    HealthPlanCosts,
    /// Annual per-mile reimbursement rate
    MileageRate,
}

impl SourceKey {
    /// Every source, in declaration order.
    pub const ALL: [SourceKey; 6] = [
        SourceKey::HousingAllowance,
        SourceKey::SubsistenceAllowance,
        SourceKey::CostOfLivingAdjustment,
        SourceKey::TaxRetirementLimits,
        SourceKey::HealthPlanCosts,
        SourceKey::MileageRate,
    ];

    /// Canonical snake_case key, also the cache-key prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKey::HousingAllowance => "housing_allowance",
            SourceKey::SubsistenceAllowance => "subsistence_allowance",
            SourceKey::CostOfLivingAdjustment => "cost_of_living_adjustment",
            SourceKey::TaxRetirementLimits => "tax_retirement_limits",
            SourceKey::HealthPlanCosts => "health_plan_costs",
            SourceKey::MileageRate => "mileage_rate",
        }
    }

    /// Default cache lifetime for values from this source.
    pub fn default_ttl_seconds(&self) -> u64 {
        match self {
            SourceKey::HousingAllowance => HOUSING_TTL_SECONDS,
            SourceKey::SubsistenceAllowance => SUBSISTENCE_TTL_SECONDS,
            SourceKey::CostOfLivingAdjustment => COLA_TTL_SECONDS,
            SourceKey::TaxRetirementLimits => TAX_LIMITS_TTL_SECONDS,
            SourceKey::HealthPlanCosts => HEALTH_COSTS_TTL_SECONDS,
            SourceKey::MileageRate => MILEAGE_TTL_SECONDS,
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKey {
    type Err = RefDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "housing_allowance" | "bah" => Ok(SourceKey::HousingAllowance),
            "subsistence_allowance" | "bas" => Ok(SourceKey::SubsistenceAllowance),
            "cost_of_living_adjustment" | "cola" => Ok(SourceKey::CostOfLivingAdjustment),
            "tax_retirement_limits" | "irs_limits" => Ok(SourceKey::TaxRetirementLimits),
            "health_plan_costs" | "tricare" => Ok(SourceKey::HealthPlanCosts),
            "mileage_rate" | "mileage" => Ok(SourceKey::MileageRate),
            _ => Err(RefDataError::UnknownSource(s.to_string())),
        }
    }
}

/// How a resolved value is denominated and displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    /// Currency in minor units (cents)
    Money,
    /// Decimal rate, e.g. dollars per mile
    Rate,
    /// Decimal fraction shown as a percentage
    Percent,
    /// Unitless number
    Plain,
}

impl FromStr for DataFormat {
    type Err = RefDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "money" => Ok(DataFormat::Money),
            "rate" => Ok(DataFormat::Rate),
            "percent" => Ok(DataFormat::Percent),
            "plain" => Ok(DataFormat::Plain),
            other => Err(RefDataError::Validation(format!("Unknown format: {other}"))),
        }
    }
}

/// Caller-declared magnitude of a raw value under a format override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueUnit {
    /// Value is in minor units (cents)
    Minor,
    /// Value is in whole units (dollars)
    Whole,
}

impl FromStr for ValueUnit {
    type Err = RefDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minor" | "cents" => Ok(ValueUnit::Minor),
            "whole" | "dollars" => Ok(ValueUnit::Whole),
            other => Err(RefDataError::Validation(format!("Unknown value unit: {other}"))),
        }
    }
}

/// Publication cadence of a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateFrequency {
    /// Published every pay period
    Biweekly,
    /// Published monthly
    Monthly,
    /// Published once a year
    Annual,
    /// Published when the issuing agency decides
    AsAnnounced,
}

impl fmt::Display for UpdateFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateFrequency::Biweekly => "biweekly",
            UpdateFrequency::Monthly => "monthly",
            UpdateFrequency::Annual => "annual",
            UpdateFrequency::AsAnnounced => "as announced",
        })
    }
}

/// Which cost-of-living table a location belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColaScope {
    /// Continental (domestic) table
    Domestic,
    /// Overseas table
    Overseas,
}

impl ColaScope {
    /// Lower-case label used in keys and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColaScope::Domestic => "domestic",
            ColaScope::Overseas => "overseas",
        }
    }
}

impl FromStr for ColaScope {
    type Err = RefDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "domestic" | "conus" => Ok(ColaScope::Domestic),
            "overseas" | "oconus" => Ok(ColaScope::Overseas),
            other => Err(RefDataError::Validation(format!("Unknown COLA scope: {other}"))),
        }
    }
}

/// Partition of the generic key/value reference table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceCategory {
    /// Tax and retirement limits
    TaxRetirementLimits,
    /// Health plan costs
    HealthPlanCosts,
}
