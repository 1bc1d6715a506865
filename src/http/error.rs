//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::astro::AstroError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (malformed body, bad coordinates or timestamp)
    BadRequest(String),
    /// The ephemeris cannot answer; computation is unavailable
    Unavailable(String),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<AstroError> for AppError {
    fn from(err: AstroError) -> Self {
        match err {
            AstroError::InvalidCoordinates(_) | AstroError::InvalidTimestamp(_) => {
                AppError::BadRequest(err.to_string())
            }
            AstroError::EphemerisUnavailable(reason) => AppError::Unavailable(format!(
                "computation is currently unavailable: {reason}"
            )),
        }
    }
}
