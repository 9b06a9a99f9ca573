//! Result shapes shared by providers, the cache, and the registry.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{DataFormat, ValueUnit};
use crate::error::RefDataError;
use crate::format::{display_value, display_with_unit};

/// One resolved unit of reference data.
///
/// `value` is denominated per `format`: money in minor units, rates and
/// percentages as decimals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedData {
    /// Raw numeric value
    pub value: f64,
    /// Currency unit for money values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Effective date of the record the value came from
    pub as_of: NaiveDate,
    /// Publishing authority
    pub source_name: String,
    /// Where the value is published
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// How `value` is denominated
    pub format: DataFormat,
    /// Precomputed display string
    pub display_value: String,
}

impl ResolvedData {
    /// Builds a resolved value, computing its display string from `format`.
    pub fn new(
        value: f64,
        format: DataFormat,
        as_of: NaiveDate,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            value,
            currency: None,
            as_of,
            source_name: source_name.into(),
            source_url: None,
            format,
            display_value: display_value(value, format),
        }
    }

    /// Attaches a currency unit.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Attaches a source URL.
    pub fn with_source_url(mut self, url: Option<String>) -> Self {
        self.source_url = url;
        self
    }

    /// Re-renders the display string under a different format.
    ///
    /// The raw value is kept; the caller declares its unit explicitly.
    pub fn reformatted(mut self, format: DataFormat, unit: ValueUnit) -> Self {
        self.display_value = display_with_unit(self.value, format, unit);
        self.format = format;
        self
    }
}

/// Uniform result returned by every provider and by the registry.
///
/// A result with `error` and no `data` must be surfaced as a caution,
/// never read as zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    /// Resolved value, absent on any failure
    pub data: Option<ResolvedData>,
    /// Reason `data` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether `data` was served from the cache
    pub cached: bool,
}

impl ProviderResult {
    /// A successful, freshly fetched result.
    pub fn found(data: ResolvedData) -> Self {
        Self {
            data: Some(data),
            error: None,
            cached: false,
        }
    }

    /// A data-less result carrying the reason.
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(reason.into()),
            cached: false,
        }
    }

    /// Converts an error into a data-less result.
    pub fn from_error(err: &RefDataError) -> Self {
        Self::not_found(err.to_string())
    }

    /// Sets the cached flag.
    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    /// Returns true if a value was resolved.
    pub fn is_found(&self) -> bool {
        self.data.is_some()
    }
}

/// Longest lifetime any entry or feed may carry (100 years).
pub const MAX_TTL_SECONDS: u64 = 100 * 365 * 86_400;

/// Converts a TTL in seconds to a duration, clamped to [`MAX_TTL_SECONDS`].
pub fn ttl_duration(ttl_seconds: u64) -> Duration {
    Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64)
}

/// A persisted cache value with its lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Cached value
    pub value: T,
    /// When the value was written
    pub cached_at: DateTime<Utc>,
    /// When the value stops being served
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Creates an entry written at `now` that lives `ttl_seconds`.
    pub fn new(value: T, now: DateTime<Utc>, ttl_seconds: u64) -> Self {
        Self {
            value,
            cached_at: now,
            expires_at: now + ttl_duration(ttl_seconds),
        }
    }

    /// An entry is valid strictly before its expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ResolvedData {
        ResolvedData::new(
            245_000.0,
            DataFormat::Money,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            "DTMO",
        )
        .with_currency("USD")
    }

    #[test]
    fn test_resolved_display_precomputed() {
        assert_eq!(sample().display_value, "$2,450.00");
    }

    #[test]
    fn test_reformatted_keeps_value() {
        let data = sample().reformatted(DataFormat::Plain, ValueUnit::Minor);
        assert_eq!(data.value, 245_000.0);
        assert_eq!(data.format, DataFormat::Plain);
        assert_eq!(data.display_value, "2,450");
    }

    #[test]
    fn test_provider_result_constructors() {
        let ok = ProviderResult::found(sample());
        assert!(ok.is_found());
        assert!(!ok.cached);
        assert!(ok.error.is_none());

        let miss = ProviderResult::not_found("nothing");
        assert!(!miss.is_found());
        assert_eq!(miss.error.as_deref(), Some("nothing"));

        let err = ProviderResult::from_error(&RefDataError::Store("down".into()));
        assert_eq!(err.error.as_deref(), Some("Store error: down"));
    }

    #[test]
    fn test_cache_entry_validity_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let entry = CacheEntry::new(1u8, now, 60);
        assert!(entry.is_valid_at(now));
        assert!(entry.is_valid_at(now + Duration::seconds(59)));
        // Expiry instant itself is already invalid
        assert!(!entry.is_valid_at(now + Duration::seconds(60)));
    }
}
