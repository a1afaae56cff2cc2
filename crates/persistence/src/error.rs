//! # Persistence Errors
//!
//! Error types for the persistence layer, wrapping sqlx and conversion
//! failures. Store-trait methods surface `StoreError` (business crate);
//! `PersistenceError` covers setup paths and row conversions.

use ganacert_business::StoreError;
use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid decimal value: {0}")]
    InvalidDecimal(String),

    #[error("Invalid {field} value in row: {value}")]
    InvalidEnumValue { field: &'static str, value: String },

    #[error("Invalid date value in row: {0}")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias with PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    pub fn invalid_enum(field: &'static str, value: &str) -> Self {
        Self::InvalidEnumValue {
            field,
            value: value.to_string(),
        }
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Map a raw sqlx error into the store-facing error type.
pub(crate) fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}
