//! # Error Module
//!
//! Domain errors for Ganacert using thiserror. These cover validation of
//! the entities themselves; business-rule and store errors live in the
//! business crate.

use crate::record::BrandStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    // === Validation errors ===
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid head count: {0} (must be at least 1)")]
    InvalidHeadCount(i64),

    #[error("Certification amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Unknown {field} value: {value}")]
    UnknownEnumValue { field: &'static str, value: String },

    #[error("Processing date {processed_at} precedes registration {registered_at}")]
    ProcessedBeforeRegistered {
        registered_at: DateTime<Utc>,
        processed_at: DateTime<Utc>,
    },

    // === Audit errors ===
    #[error("Audit entry must change status (both sides are {0})")]
    NoStatusChange(BrandStatus),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn unknown_enum(field: &'static str, value: &str) -> Self {
        Self::UnknownEnumValue {
            field,
            value: value.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::InvalidHeadCount(_)
                | CoreError::NegativeAmount(_)
                | CoreError::UnknownEnumValue { .. }
                | CoreError::ProcessedBeforeRegistered { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidHeadCount(0);
        assert_eq!(err.to_string(), "Invalid head count: 0 (must be at least 1)");

        let err = CoreError::unknown_enum("breed", "ZEBU");
        assert_eq!(err.to_string(), "Unknown breed value: ZEBU");
    }

    #[test]
    fn test_validation_predicate() {
        assert!(CoreError::InvalidHeadCount(0).is_validation());
        assert!(CoreError::unknown_enum("purpose", "x").is_validation());
        assert!(!CoreError::NoStatusChange(BrandStatus::Pending).is_validation());
    }
}
