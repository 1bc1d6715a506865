//! Application state for the HTTP server.

use std::sync::Arc;

use crate::astro::Ephemeris;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded ephemeris; read-only after startup
    pub ephemeris: Arc<Ephemeris>,
}

impl AppState {
    /// Create a new application state around a loaded ephemeris.
    pub fn new(ephemeris: Arc<Ephemeris>) -> Self {
        Self { ephemeris }
    }
}
