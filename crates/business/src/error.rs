//! # Business Errors
//!
//! Error taxonomy for the engines. Every variant carries structured
//! context and maps to a stable machine-readable kind for API/CLI layers;
//! human-facing formatting stays out of this crate.

use crate::stores::StoreError;
use chrono::NaiveDate;
use ganacert_core::{BrandStatus, CoreError};
use thiserror::Error;

/// Business-layer errors.
#[derive(Debug, Error)]
pub enum BusinessError {
    /// Malformed input; rejected synchronously, never retried.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The requested edge is not in the transition table. Terminal
    /// business-rule violation, never silently retried.
    #[error("Invalid transition for {record_id}: {from} -> {to}")]
    InvalidTransition {
        record_id: String,
        from: BrandStatus,
        to: BrandStatus,
    },

    /// Stale optimistic version. Caller-retryable; the engine never
    /// retries internally.
    #[error("Version conflict on {record_id}: expected {expected}, found {found}")]
    Conflict {
        record_id: String,
        expected: i64,
        found: i64,
    },

    #[error("Record not found: {0}")]
    NotFound(String),

    /// Per-item failure during batch snapshot/report computation.
    #[error("Aggregation failed for {date}: {reason}")]
    Aggregation { date: NaiveDate, reason: String },

    /// Data-integrity bug (e.g. an audit entry referencing a nonexistent
    /// record); fatal, never swallowed.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

/// Result type alias with BusinessError
pub type BusinessResult<T> = Result<T, BusinessError>;

impl From<StoreError> for BusinessError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => BusinessError::NotFound(id),
            StoreError::StaleVersion {
                id,
                expected,
                found,
            } => BusinessError::Conflict {
                record_id: id,
                expected,
                found,
            },
            StoreError::ForeignKey(msg) => BusinessError::Integrity(msg),
            other => BusinessError::Store(other),
        }
    }
}

impl BusinessError {
    /// Stable machine-readable kind, for exit codes and error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            BusinessError::Validation(_) => "validation",
            BusinessError::InvalidTransition { .. } => "invalid_transition",
            BusinessError::Conflict { .. } => "conflict",
            BusinessError::NotFound(_) => "not_found",
            BusinessError::Aggregation { .. } => "aggregation",
            BusinessError::Integrity(_) => "integrity",
            BusinessError::Store(_) => "store",
        }
    }

    /// Only version conflicts are worth re-reading and retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BusinessError::Conflict { .. })
    }
}
