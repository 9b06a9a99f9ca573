//! Engine configuration.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use refdata_core::error::{RefDataError, Result};
use refdata_core::types::SourceKey;
use refdata_providers::SubsistenceRates;

/// Default snapshot file for the file-backed store.
pub const DEFAULT_STORE_PATH: &str = "refdata.bin";

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Snapshot file for the file-backed store
    pub store_path: PathBuf,
    /// Whether resolutions go through the cache
    pub enable_cache: bool,
    /// One TTL for every source, replacing the per-source defaults
    pub ttl_override_seconds: Option<u64>,
    /// Subsistence allowance rates
    pub subsistence: SubsistenceRates,
    /// File store saves after this many writes
    pub auto_save_threshold: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            enable_cache: true,
            ttl_override_seconds: None,
            subsistence: SubsistenceRates::default(),
            auto_save_threshold: 100,
        }
    }
}

impl EngineConfig {
    /// Loads `.env` if present, then reads `REFDATA_*` variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`; unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("REFDATA_STORE_PATH") {
            config.store_path = PathBuf::from(path);
        }
        if let Some(v) = lookup("REFDATA_ENABLE_CACHE") {
            config.enable_cache = parse_flag("REFDATA_ENABLE_CACHE", &v)?;
        }
        if let Some(v) = lookup("REFDATA_CACHE_TTL_SECONDS") {
            config.ttl_override_seconds = Some(parse_var("REFDATA_CACHE_TTL_SECONDS", &v)?);
        }
        if let Some(v) = lookup("REFDATA_BAS_ENLISTED_CENTS") {
            config.subsistence.enlisted_cents = parse_var("REFDATA_BAS_ENLISTED_CENTS", &v)?;
        }
        if let Some(v) = lookup("REFDATA_BAS_OFFICER_CENTS") {
            config.subsistence.officer_cents = parse_var("REFDATA_BAS_OFFICER_CENTS", &v)?;
        }
        if let Some(v) = lookup("REFDATA_BAS_LAST_UPDATED") {
            config.subsistence.last_updated =
                parse_var::<NaiveDate>("REFDATA_BAS_LAST_UPDATED", &v)?;
        }
        if let Some(v) = lookup("REFDATA_AUTO_SAVE") {
            config.auto_save_threshold = parse_var("REFDATA_AUTO_SAVE", &v)?;
        }

        Ok(config)
    }

    /// Uses the given snapshot file.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Disables caching.
    pub fn no_cache(mut self) -> Self {
        self.enable_cache = false;
        self
    }

    /// Uses one TTL for every source.
    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_override_seconds = Some(ttl_seconds);
        self
    }

    /// TTL applied to cached values of `source`.
    pub fn ttl_for(&self, source: SourceKey) -> u64 {
        self.ttl_override_seconds
            .unwrap_or_else(|| source.default_ttl_seconds())
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| RefDataError::Config(format!("{name}={value:?}: {e}")))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(RefDataError::Config(format!(
            "{name}={value:?}: expected true/false, 1/0, yes/no or on/off"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.ttl_for(SourceKey::HousingAllowance), 86_400);
        assert_eq!(config.ttl_for(SourceKey::MileageRate), 604_800);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("REFDATA_STORE_PATH", "/var/lib/refdata/store.bin"),
            ("REFDATA_ENABLE_CACHE", "0"),
            ("REFDATA_CACHE_TTL_SECONDS", "120"),
            ("REFDATA_BAS_ENLISTED_CENTS", "47000"),
            ("REFDATA_BAS_OFFICER_CENTS", "33000"),
            ("REFDATA_BAS_LAST_UPDATED", "2026-01-01"),
            ("REFDATA_AUTO_SAVE", "10"),
        ]))
        .unwrap();

        assert_eq!(config.store_path, PathBuf::from("/var/lib/refdata/store.bin"));
        assert!(!config.enable_cache);
        assert_eq!(config.ttl_for(SourceKey::HealthPlanCosts), 120);
        assert_eq!(config.subsistence.enlisted_cents, 47_000);
        assert_eq!(config.subsistence.officer_cents, 33_000);
        assert_eq!(
            config.subsistence.last_updated,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
        assert_eq!(config.auto_save_threshold, 10);
    }

    #[test]
    fn test_unparseable_is_config_error() {
        let err = EngineConfig::from_lookup(lookup_from(&[("REFDATA_CACHE_TTL_SECONDS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, RefDataError::Config(_)));
        assert!(err.to_string().contains("REFDATA_CACHE_TTL_SECONDS"));
    }

    #[test_case("FALSE", false ; "upper case false")]
    #[test_case(" no ", false ; "padded no")]
    #[test_case("off", false ; "off")]
    #[test_case("True", true ; "mixed case true")]
    #[test_case("yes", true ; "yes")]
    fn test_enable_cache_flag(raw: &str, expected: bool) {
        let config =
            EngineConfig::from_lookup(lookup_from(&[("REFDATA_ENABLE_CACHE", raw)])).unwrap();
        assert_eq!(config.enable_cache, expected);
    }

    #[test]
    fn test_unknown_enable_cache_flag_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[("REFDATA_ENABLE_CACHE", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, RefDataError::Config(_)));
        assert!(err.to_string().contains("REFDATA_ENABLE_CACHE"));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_store_path("x.bin")
            .no_cache()
            .with_ttl(5);
        assert_eq!(config.store_path, PathBuf::from("x.bin"));
        assert!(!config.enable_cache);
        assert_eq!(config.ttl_for(SourceKey::CostOfLivingAdjustment), 5);
    }
}
