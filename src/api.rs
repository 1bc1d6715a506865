//! Public API surface for the observation service.
//!
//! This file consolidates the DTO types for the HTTP API: the observation
//! request and every structure appearing in a body report. All types derive
//! Serialize/Deserialize for JSON serialization; optional fields are skipped
//! when absent so the payload shape is a deterministic function of the
//! request (location supplied or not, body requested), never of computation
//! success.

use serde::{Deserialize, Serialize};

pub use crate::models::JulianDate;

/// Incoming observation request. All fields optional: an empty body means a
/// geocentric frame at the current UTC instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationRequest {
    /// Latitude in decimal degrees (-90 to 90)
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees (-180 to 180)
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Observer height above sea level in meters (default 0)
    #[serde(default)]
    pub height: Option<f64>,
    /// UTC timestamp (RFC 3339 or `YYYY-MM-DD HH:MM:SS`); default now
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ObservationRequest {
    pub fn has_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Observer echo included in located responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeographicLocation {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Height in meters above sea level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_m: Option<f64>,
}

/// An angle carried both as decimal degrees and as a sexagesimal string.
///
/// Both renderings always come from the same underlying value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngleDual {
    pub degrees: f64,
    pub dms: String,
}

impl AngleDual {
    pub fn from_degrees(value: f64) -> Self {
        Self {
            degrees: round2(value),
            dms: format_dms(value),
        }
    }
}

/// Format an angle in degrees as `[-]DD:MM:SS.S`.
fn format_dms(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let total_tenths = (value.abs() * 36_000.0).round() as u64;
    let tenths = total_tenths % 10;
    let seconds = (total_tenths / 10) % 60;
    let minutes = (total_tenths / 600) % 60;
    let degrees = total_tenths / 36_000;
    format!("{sign}{degrees}:{minutes:02}:{seconds:02}.{tenths}")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Topocentric pointing block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionInfo {
    pub altitude: AngleDual,
    pub azimuth: AngleDual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightAscension {
    pub hours: f64,
    pub degrees: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declination {
    pub degrees: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelestialCoordinates {
    pub right_ascension: RightAscension,
    pub declination: Declination,
}

/// Distance in the three units the payload reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceInfo {
    pub km: f64,
    pub au: f64,
    pub light_seconds: f64,
}

/// Sun–Moon geometry backing the phase percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IlluminationDetails {
    pub elongation_degrees: f64,
    pub phase_angle_degrees: f64,
    pub illuminated_fraction: f64,
    pub illuminated_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoonAge {
    pub days: f64,
    pub percentage_of_cycle: f64,
}

/// One dated phase event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEventInfo {
    pub phase: String,
    pub date: String,
}

/// Previous and next new/full moon, each list chronological.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTimeline {
    pub previous: Vec<PhaseEventInfo>,
    pub next: Vec<PhaseEventInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrationInfo {
    pub longitude_degrees: f64,
    pub latitude_degrees: f64,
    pub position_angle_degrees: f64,
    pub note: String,
}

/// A rise or set crossing; illumination for the Moon, magnitude for Mars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonEventInfo {
    pub time: String,
    pub azimuth_degrees: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illumination_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
}

/// A meridian transit with the peak geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitEventInfo {
    pub time: String,
    pub altitude_degrees: f64,
    pub azimuth_degrees: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illumination_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
}

/// Moon horizon events; sub-fields absent when the geometry is circumpolar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoonRiseSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_moonrise: Option<HorizonEventInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_moonset: Option<HorizonEventInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_transit: Option<TransitEventInfo>,
}

/// Mars horizon events; sub-fields absent when the geometry is circumpolar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarsRiseSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_marsrise: Option<HorizonEventInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_marsset: Option<HorizonEventInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_transit: Option<TransitEventInfo>,
}

/// Atmospheric viewing summary; extinction fields absent below the horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewingConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atmospheric_extinction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extinction_effect: Option<String>,
    pub best_viewing_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunSeparation {
    pub degrees: f64,
    pub opposition_proximity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarsSeasons {
    pub mars_year: i32,
    pub solar_longitude_deg: f64,
    pub season: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AngularDiameter {
    pub arcseconds: f64,
}

/// Time-scale echo for the request instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeScales {
    pub utc: String,
    pub tt_jd: f64,
    pub tdb_jd: f64,
}

/// Precision metadata: which dataset answered, in what frame, with which
/// corrections applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecisionInfo {
    pub ephemeris: String,
    pub reference_frame: String,
    pub corrections: Vec<String>,
}

/// The assembled response payload for one body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyReport {
    pub name: String,
    pub timestamp: String,

    /// Present iff the request carried an observer location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionInfo>,

    pub celestial_coordinates: CelestialCoordinates,
    pub distance: DistanceInfo,
    pub constellation: String,
    pub constellation_precise: String,

    // Moon-specific fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub illumination_details: Option<IlluminationDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moon_age: Option<MoonAge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phases: Option<PhaseTimeline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libration: Option<LibrationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moonrise_and_set: Option<MoonRiseSet>,

    // Mars-specific fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angular_diameter: Option<AngularDiameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sun_separation: Option<SunSeparation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mars_seasons: Option<MarsSeasons>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marsrise_and_set: Option<MarsRiseSet>,

    /// Present iff the request carried an observer location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewing_conditions: Option<ViewingConditions>,
    /// Present iff the request carried an observer location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observer: Option<GeographicLocation>,

    pub time_scales: TimeScales,
    pub precision: PrecisionInfo,
}
