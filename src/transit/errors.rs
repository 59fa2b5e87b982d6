//! # Transit Errors

use thiserror::Error;

use crate::query::QueryError;

/// Result type for transit operations
pub type TransitResult<T> = Result<T, TransitError>;

/// Transit operation errors
#[derive(Debug, Clone, Error)]
pub enum TransitError {
    /// The stop id or name matched nothing
    #[error("Specified departure stop was not found")]
    StopNotFound,

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl TransitError {
    /// Caller-facing reason code
    pub fn code(&self) -> &'static str {
        match self {
            TransitError::StopNotFound => "201",
            TransitError::Query(_) => "100",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            TransitError::StopNotFound => 400,
            TransitError::Query(err) => err.status_code(),
        }
    }
}
