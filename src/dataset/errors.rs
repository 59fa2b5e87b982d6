//! # Dataset Errors

use thiserror::Error;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Dataset errors
#[derive(Debug, Clone, Error)]
pub enum DatasetError {
    #[error("Cannot open dataset for {provider} at {path}: {message}")]
    Open {
        provider: String,
        path: String,
        message: String,
    },

    #[error("Dataset for {provider} failed verification: {message}")]
    Verify { provider: String, message: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DatasetError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            DatasetError::UnknownProvider(_) => 404,
            DatasetError::Open { .. } => 500,
            DatasetError::Verify { .. } => 500,
            DatasetError::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(DatasetError::UnknownProvider("sl".into()).status_code(), 404);
        assert_eq!(DatasetError::Internal("x".into()).status_code(), 500);
    }
}
