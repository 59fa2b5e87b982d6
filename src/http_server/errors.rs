//! # HTTP Errors
//!
//! The single conversion point from domain errors into responses. Bodies are
//! `{ "message", "code" }`; internal failures add `debug` for loopback
//! callers only.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::admission::AdmissionError;
use crate::query::QueryError;
use crate::transit::TransitError;

/// Result type for request handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Reason code of every internal failure
pub const INTERNAL_CODE: &str = "100";

/// Request-level errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error("Specified departure stop was not found")]
    StopNotFound,

    /// Unknown route or provider
    #[error("Resource not found")]
    NotFound,

    /// Storage, query or task failure; the message is diagnostic only
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TransitError> for ApiError {
    fn from(err: TransitError) -> Self {
        match err {
            TransitError::StopNotFound => ApiError::StopNotFound,
            TransitError::Query(err) => err.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Admission(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::FORBIDDEN)
            }
            ApiError::StopNotFound => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing reason code, if the error has one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::Admission(err) => Some(err.code()),
            ApiError::StopNotFound => Some("201"),
            ApiError::NotFound => None,
            ApiError::Internal(_) => Some(INTERNAL_CODE),
        }
    }

    /// Render for a caller at `peer`
    pub fn into_response_for(self, peer: Option<SocketAddr>) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Internal(message) => {
                error!(error = %message, "request failed");
                let debug = peer
                    .filter(|addr| addr.ip().is_loopback())
                    .map(|_| message.clone());
                ErrorBody {
                    message: "Internal error".to_string(),
                    code: Some(INTERNAL_CODE),
                    debug,
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                code: other.code(),
                debug: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_for(None)
    }
}
