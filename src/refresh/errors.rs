//! # Refresh Errors
//!
//! Per-provider failures of the refresh jobs. They are logged and reported,
//! never propagated out of the coordinator.

use thiserror::Error;

use crate::dataset::DatasetError;

/// A full reimport of one provider failed
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    #[error("Import command for {provider} failed: {message}")]
    Command { provider: String, message: String },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Import for {provider} panicked: {message}")]
    Panicked { provider: String, message: String },
}

/// A real-time update of one provider failed
#[derive(Debug, Clone, Error)]
pub enum UpdateError {
    #[error("Update command for {provider} failed: {message}")]
    Command { provider: String, message: String },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Update for {provider} panicked: {message}")]
    Panicked { provider: String, message: String },
}

/// Invalid cron expression
#[derive(Debug, Clone, Error)]
#[error("Invalid schedule '{expression}': {message}")]
pub struct ScheduleError {
    pub expression: String,
    pub message: String,
}

/// Errors a provider job can end with
pub(crate) trait JobError: From<DatasetError> + Send + 'static {
    fn panicked(provider: &str, message: String) -> Self;
}

impl JobError for ImportError {
    fn panicked(provider: &str, message: String) -> Self {
        ImportError::Panicked {
            provider: provider.to_string(),
            message,
        }
    }
}

impl JobError for UpdateError {
    fn panicked(provider: &str, message: String) -> Self {
        UpdateError::Panicked {
            provider: provider.to_string(),
            message,
        }
    }
}
