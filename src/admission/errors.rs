//! # Admission Errors
//!
//! Denial reasons of the admission gate. Each one maps to a stable
//! caller-facing reason code that clients match on.

use thiserror::Error;

/// Result type for admission decisions
pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// Why a request was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("System is in maintenance mode")]
    Maintenance,

    #[error("The specified key is not valid")]
    InvalidKey,

    #[error("Your key is not active")]
    InactiveKey,

    #[error("Your request could not be processed as you are over your limit ({limit})")]
    QuotaExceeded { limit: i64 },
}

impl AdmissionError {
    /// Caller-facing reason code
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionError::InvalidKey => "500",
            AdmissionError::InactiveKey => "501",
            AdmissionError::QuotaExceeded { .. } => "502",
            AdmissionError::Maintenance => "503",
        }
    }

    /// Get HTTP status code. Every denial is a 403.
    pub fn status_code(&self) -> u16 {
        403
    }
}
