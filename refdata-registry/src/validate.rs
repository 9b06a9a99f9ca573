//! Request validation.
//!
//! Turns a loose [`DataRefRequest`] into a typed [`DataQuery`]. Runs before
//! any store access, so a rejected request costs no I/O.

use chrono::Datelike;

use refdata_core::error::{RefDataError, Result};
use refdata_core::types::{
    ColaQuery, DataFormat, DataQuery, DataRefRequest, HousingQuery, MileageQuery,
    ReferenceQuery, RequestParams, SourceKey, SubsistenceQuery, ValueUnit,
};

/// A request that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Typed query for the provider
    pub query: DataQuery,
    /// Display override with its declared unit
    pub display: Option<(DataFormat, ValueUnit)>,
}

/// Validates a request against the per-source required-field table.
pub fn validate(request: &DataRefRequest) -> Result<ValidatedRequest> {
    let source: SourceKey = request.source.parse()?;

    let display = match (request.format, request.value_unit) {
        (Some(format), Some(unit)) => Some((format, unit)),
        (Some(_), None) => {
            return Err(RefDataError::Validation(
                "value_unit is required when format is overridden".into(),
            ))
        }
        (None, _) => None,
    };

    let p = &request.params;
    let query = match source {
        SourceKey::HousingAllowance => DataQuery::HousingAllowance(HousingQuery {
            paygrade: required(source, "paygrade", &p.paygrade)?,
            location_code: required(source, "code", &p.code)?,
            with_dependents: p.with_dependents.unwrap_or(false),
            as_of: p.as_of,
        }),
        SourceKey::SubsistenceAllowance => DataQuery::SubsistenceAllowance(SubsistenceQuery {
            paygrade: required(source, "paygrade", &p.paygrade)?,
        }),
        SourceKey::CostOfLivingAdjustment => DataQuery::CostOfLivingAdjustment(ColaQuery {
            location_code: required(source, "code", &p.code)?,
            paygrade: required(source, "paygrade", &p.paygrade)?,
            with_dependents: p.with_dependents.unwrap_or(false),
            scope: p.cola_scope,
            as_of: p.as_of,
        }),
        SourceKey::TaxRetirementLimits => DataQuery::TaxRetirementLimits(reference(source, p)?),
        SourceKey::HealthPlanCosts => DataQuery::HealthPlanCosts(reference(source, p)?),
        SourceKey::MileageRate => DataQuery::MileageRate(MileageQuery {
            year: p.year.or_else(|| p.as_of.map(|d| d.year())),
            as_of: p.as_of,
        }),
    };

    Ok(ValidatedRequest { query, display })
}

fn reference(source: SourceKey, p: &RequestParams) -> Result<ReferenceQuery> {
    Ok(ReferenceQuery {
        field: required(source, "field", &p.field)?,
        year: p.year.or_else(|| p.as_of.map(|d| d.year())),
    })
}

fn required(source: SourceKey, field: &'static str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(RefDataError::MissingField {
            source_key: source,
            field,
        }),
    }
}
