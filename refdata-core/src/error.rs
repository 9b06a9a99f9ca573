//! Error types for reference-data resolution.
//!
//! This module provides the error hierarchy using `thiserror`.
//! Expected conditions (missing data, bad input) are converted into
//! [`ProviderResult`](crate::types::ProviderResult) values at the registry
//! boundary; only the cache layer lets a failing fetch propagate.

use thiserror::Error;

use crate::types::SourceKey;

/// Result type alias using `RefDataError`.
pub type Result<T> = std::result::Result<T, RefDataError>;

/// Main error type for all refdata operations.
#[derive(Debug, Error)]
pub enum RefDataError {
    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A parameter required by the requested source was not supplied.
    #[error("{field} is required for {source_key}")]
    MissingField {
        /// Source the request targeted
        source_key: SourceKey,
        /// Name of the missing parameter
        field: &'static str,
    },

    /// Input validation failed.
    #[error("{0}")]
    Validation(String),

    /// The request named a source outside the closed vocabulary.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUP ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// No record matched the parameters and date.
    #[error("{0}")]
    NotFound(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Backing store failure.
    #[error("Store error: {0}")]
    Store(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot encoding error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot format version mismatch.
    #[error("Snapshot version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version this build writes
        expected: u8,
        /// Version found on disk
        actual: u8,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION & INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RefDataError {
    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RefDataError::Store(_) | RefDataError::Io(_))
    }

    /// Returns true if the request itself was invalid.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            RefDataError::MissingField { .. }
                | RefDataError::Validation(_)
                | RefDataError::UnknownSource(_)
        )
    }

    /// Returns true if upstream simply has no data for the request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RefDataError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = RefDataError::MissingField {
            source_key: SourceKey::HousingAllowance,
            field: "paygrade",
        };
        assert_eq!(err.to_string(), "paygrade is required for housing_allowance");
    }

    #[test]
    fn test_unknown_source_display() {
        let err = RefDataError::UnknownSource("weather".into());
        assert_eq!(err.to_string(), "Unknown source: weather");
    }

    #[test]
    fn test_error_classification() {
        assert!(RefDataError::Store("timeout".into()).is_recoverable());
        assert!(!RefDataError::NotFound("none".into()).is_recoverable());

        assert!(RefDataError::UnknownSource("x".into()).is_validation_error());
        assert!(RefDataError::Validation("bad".into()).is_validation_error());
        assert!(!RefDataError::Store("down".into()).is_validation_error());

        assert!(RefDataError::NotFound("none".into()).is_not_found());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let result: Result<serde_json::Value> = json_result.map_err(RefDataError::from);
        assert!(matches!(result, Err(RefDataError::Json(_))));
    }
}
