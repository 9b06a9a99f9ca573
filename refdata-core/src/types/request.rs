//! Inbound request shape.
//!
//! Requests arrive loosely typed (JSON batch files, CLI flags) and are
//! validated into a [`DataQuery`](super::DataQuery) before any store access.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ColaScope, DataFormat, ValueUnit};

/// Source-specific parameter bag. Which fields are required depends on the source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Location code (housing area, COLA location)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Paygrade, e.g. `E05`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paygrade: Option<String>,
    /// Whether the member has dependents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_dependents: Option<bool>,
    /// Named field in a key/value reference table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Publication year for annual tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Date the value should be effective on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    /// Restricts the COLA lookup to one table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cola_scope: Option<ColaScope>,
}

/// A typed request for one unit of reference data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataRefRequest {
    /// Source key as supplied by the caller (may be unknown)
    pub source: String,
    /// Source-specific parameters
    #[serde(flatten)]
    pub params: RequestParams,
    /// Display-format override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DataFormat>,
    /// Magnitude of the raw value; required whenever `format` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_unit: Option<ValueUnit>,
}

impl DataRefRequest {
    /// Creates a request for the given source with no parameters.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            params: RequestParams::default(),
            format: None,
            value_unit: None,
        }
    }

    /// Sets the location code.
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.params.code = Some(code.into());
        self
    }

    /// Sets the paygrade.
    pub fn paygrade(mut self, paygrade: impl Into<String>) -> Self {
        self.params.paygrade = Some(paygrade.into());
        self
    }

    /// Sets the dependency flag.
    pub fn with_dependents(mut self, with_dependents: bool) -> Self {
        self.params.with_dependents = Some(with_dependents);
        self
    }

    /// Sets the reference-table field name.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.params.field = Some(field.into());
        self
    }

    /// Sets the publication year.
    pub fn year(mut self, year: i32) -> Self {
        self.params.year = Some(year);
        self
    }

    /// Sets the as-of date.
    pub fn as_of(mut self, as_of: NaiveDate) -> Self {
        self.params.as_of = Some(as_of);
        self
    }

    /// Restricts a COLA lookup to one table.
    pub fn cola_scope(mut self, scope: ColaScope) -> Self {
        self.params.cola_scope = Some(scope);
        self
    }

    /// Overrides the display format, declaring the raw value's unit.
    pub fn display_as(mut self, format: DataFormat, unit: ValueUnit) -> Self {
        self.format = Some(format);
        self.value_unit = Some(unit);
        self
    }
}
