//! Cache key generation.
//!
//! Keys are [`source_prefix`] followed by `name=value` segments in a fixed
//! order, joined by `:`. Values are percent-escaped for `%`, `:` and `=`, so
//! two parameter sets share a key only if every field matches. A key with no
//! segments is the bare prefix, so prefix invalidation always reaches it.

use chrono::NaiveDate;

use refdata_core::normalize::{normalize_code, normalize_field, normalize_paygrade};
use refdata_core::types::{ColaScope, DataQuery, SourceKey};

/// Parameters that select one cached value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheKeyParams {
    /// Source the value belongs to
    pub source: SourceKey,
    /// Location code
    pub code: Option<String>,
    /// Paygrade
    pub paygrade: Option<String>,
    /// Dependency status
    pub with_dependents: Option<bool>,
    /// Reference field name
    pub field: Option<String>,
    /// Publication or rate year
    pub year: Option<i32>,
    /// Effective date
    pub as_of: Option<NaiveDate>,
    /// COLA table restriction
    pub scope: Option<ColaScope>,
}

impl CacheKeyParams {
    /// Key parameters for a source with no fields set.
    pub fn new(source: SourceKey) -> Self {
        Self {
            source,
            code: None,
            paygrade: None,
            with_dependents: None,
            field: None,
            year: None,
            as_of: None,
            scope: None,
        }
    }
}

impl From<&DataQuery> for CacheKeyParams {
    fn from(query: &DataQuery) -> Self {
        let mut params = CacheKeyParams::new(query.source_key());
        match query {
            DataQuery::HousingAllowance(q) => {
                params.paygrade = Some(normalize_paygrade(&q.paygrade));
                params.code = Some(normalize_code(&q.location_code));
                params.with_dependents = Some(q.with_dependents);
                params.as_of = q.as_of;
            }
            DataQuery::SubsistenceAllowance(q) => {
                params.paygrade = Some(normalize_paygrade(&q.paygrade));
            }
            DataQuery::CostOfLivingAdjustment(q) => {
                params.code = Some(normalize_code(&q.location_code));
                params.paygrade = Some(normalize_paygrade(&q.paygrade));
                params.with_dependents = Some(q.with_dependents);
                params.as_of = q.as_of;
                params.scope = q.scope;
            }
            DataQuery::TaxRetirementLimits(q) | DataQuery::HealthPlanCosts(q) => {
                params.field = Some(normalize_field(&q.field));
                params.year = q.year;
            }
            DataQuery::MileageRate(q) => {
                params.year = q.year;
                params.as_of = q.as_of;
            }
        }
        params
    }
}

/// Prefix shared by every key of `source`.
pub fn source_prefix(source: SourceKey) -> String {
    format!("{}:", source.as_str())
}

/// Builds the deterministic key for `params`.
pub fn generate_cache_key(params: &CacheKeyParams) -> String {
    let mut key = source_prefix(params.source);
    let mut first = true;

    let segments = [
        ("code", params.code.clone()),
        ("paygrade", params.paygrade.clone()),
        ("deps", params.with_dependents.map(|d| d.to_string())),
        ("field", params.field.clone()),
        ("year", params.year.map(|y| y.to_string())),
        ("as_of", params.as_of.map(|d| d.to_string())),
        ("scope", params.scope.map(|s| s.as_str().to_string())),
    ];

    for (name, value) in segments {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            if !first {
                key.push(':');
            }
            first = false;
            key.push_str(name);
            key.push('=');
            key.push_str(&escape(&value));
        }
    }
    key
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            '=' => out.push_str("%3D"),
            other => out.push(other),
        }
    }
    out
}
