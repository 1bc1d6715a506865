//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! The report payload types live in the core library and are re-exported
//! here since they already derive Serialize/Deserialize.

use serde::{Deserialize, Serialize};

pub use crate::api::{BodyReport, GeographicLocation, ObservationRequest};
pub use super::error::ErrorResponse;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Identifier of the ephemeris dataset in use
    pub ephemeris: String,
}
