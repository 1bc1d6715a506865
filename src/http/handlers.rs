//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to one supported body and delegates to the
//! service layer for the computation. Request bodies are read as raw text:
//! an empty body is a valid request (geocentric frame, current instant),
//! while malformed JSON is rejected with an explicit error rather than
//! being treated as absent.

use axum::{extract::State, Json};

use super::dto::{HealthResponse, ObservationRequest};
use super::error::AppError;
use super::state::AppState;
use crate::astro::Body;
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint reporting the dataset tier in use.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        ephemeris: state.ephemeris.tier().ephemeris_id().to_string(),
    }))
}

// =============================================================================
// Body Reports
// =============================================================================

/// GET|POST /v1/bodies/moon
pub async fn moon_report(
    State(state): State<AppState>,
    body: String,
) -> HandlerResult<crate::api::BodyReport> {
    body_report(state, Body::Moon, body).await
}

/// GET|POST /v1/bodies/mars
pub async fn mars_report(
    State(state): State<AppState>,
    body: String,
) -> HandlerResult<crate::api::BodyReport> {
    body_report(state, Body::Mars, body).await
}

async fn body_report(
    state: AppState,
    body: Body,
    raw: String,
) -> HandlerResult<crate::api::BodyReport> {
    let request = parse_request(&raw)?;
    let ephemeris = state.ephemeris.clone();

    // Wrap the computation in spawn_blocking: the event searches are
    // CPU-bound loops over the series
    let report = tokio::task::spawn_blocking(move || {
        services::compute_report(&ephemeris, body, &request)
    })
    .await
    .map_err(|e| AppError::Internal(format!("task join error: {e}")))??;

    Ok(Json(report))
}

/// Parse the raw request body: absent/empty means defaults, anything else
/// must be valid JSON.
fn parse_request(raw: &str) -> Result<ObservationRequest, AppError> {
    if raw.trim().is_empty() {
        return Ok(ObservationRequest::default());
    }
    serde_json::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))
}
