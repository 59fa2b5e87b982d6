//! # Query Errors

use thiserror::Error;

use crate::dataset::DatasetError;

/// Result type for query execution
pub type QueryResult<T> = Result<T, QueryError>;

/// Query errors
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Preparing or stepping the statement failed. Carries the statement text
    /// for diagnostics; it is never shown to untrusted callers.
    #[error("Query failed: {message} (statement: {statement})")]
    Statement { statement: String, message: String },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl QueryError {
    pub(crate) fn statement(statement: &str, err: rusqlite::Error) -> Self {
        QueryError::Statement {
            statement: statement.to_string(),
            message: err.to_string(),
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::Statement { .. } => 500,
            QueryError::Dataset(err) => err.status_code(),
        }
    }
}
