//! CLI error envelope: every failure maps to a machine-readable kind,
//! printed as JSON on stderr with a non-zero exit code.

use ganacert_business::{BusinessError, StoreError};
use ganacert_persistence::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Business(#[from] BusinessError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        CliError::Business(err.into())
    }
}

impl CliError {
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Business(err) => err.kind(),
            CliError::Persistence(_) => "persistence",
            CliError::InvalidArgument(_) => "invalid_argument",
            CliError::Io(_) => "io",
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
