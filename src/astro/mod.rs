//! Astronomical computation pipeline.
//!
//! This module contains everything between a validated request and the
//! assembled response payload:
//!
//! - [`timescales`]: UTC → TT/TDB normalization
//! - [`frames`]: observer frame construction and spherical transforms
//! - [`lunar`] / [`solar`]: geocentric ecliptic positions (lunar periodic
//!   series, VSOP87D planetary theory)
//! - [`nutation`]: truncated nutation series and obliquity
//! - [`ephemeris`]: the tiered ephemeris provider
//! - [`constellation`]: basic and boundary-catalog constellation lookup
//! - [`events`]: phase-change and rise/set/transit searches
//!
//! The loaded ephemeris is process-wide read-only state, initialized once
//! (eagerly by the server binary, lazily otherwise) and never reloaded.

pub mod constellation;
pub mod ephemeris;
pub mod events;
pub mod frames;
pub mod lunar;
pub mod nutation;
pub mod solar;
pub mod timescales;

pub use ephemeris::{ApparentPosition, Ephemeris, PrecisionTier};
pub use frames::ObserverFrame;
pub use timescales::TimeContext;

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Supported celestial bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Moon,
    Mars,
}

impl Body {
    pub fn name(&self) -> &'static str {
        match self {
            Body::Moon => "moon",
            Body::Mars => "mars",
        }
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Geocentric ecliptic position (equinox of date).
#[derive(Debug, Clone, Copy)]
pub struct EclipticPosition {
    /// Ecliptic longitude in degrees, [0, 360)
    pub lon_deg: f64,
    /// Ecliptic latitude in degrees
    pub lat_deg: f64,
    /// Distance from the Earth's center in km
    pub distance_km: f64,
}

/// Errors produced by the computation pipeline.
///
/// `InvalidCoordinates` and `InvalidTimestamp` reject the request before any
/// computation; `EphemerisUnavailable` is fatal for the whole request since
/// position data is foundational. Partial faults in derived fields (precise
/// constellation, libration) are recovered locally and never surface here.
#[derive(Debug, Clone, Error)]
pub enum AstroError {
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("ephemeris unavailable: {0}")]
    EphemerisUnavailable(String),
}

/// Global ephemeris instance initialized once per process.
static EPHEMERIS: OnceLock<Arc<Ephemeris>> = OnceLock::new();

/// Initialize the global ephemeris singleton.
///
/// Safe to call more than once; only the first call loads the dataset.
pub fn init_ephemeris() {
    if EPHEMERIS.get().is_some() {
        return;
    }
    let _ = EPHEMERIS.set(Arc::new(Ephemeris::load()));
}

/// Get a reference to the global ephemeris instance, loading it on first use.
pub fn get_ephemeris() -> &'static Arc<Ephemeris> {
    if EPHEMERIS.get().is_none() {
        init_ephemeris();
    }
    EPHEMERIS
        .get()
        .expect("ephemeris initialized by init_ephemeris")
}
