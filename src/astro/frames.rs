//! Observer reference frames and spherical coordinate transforms.
//!
//! An [`ObserverFrame`] is either geocentric (no location supplied) or
//! topocentric (latitude/longitude/height). Frames are validated at
//! construction and used read-only for the rest of the request.
//!
//! The free functions implement the standard transforms the calculators
//! compose: Greenwich/local sidereal time, ecliptic ↔ equatorial,
//! equatorial → horizontal, lunar parallax, and Bennett refraction.

use serde::{Deserialize, Serialize};

use super::AstroError;

/// Earth equatorial radius in km, used for the lunar parallax correction.
pub const EARTH_RADIUS_KM: f64 = 6_378.14;

/// Observer reference frame for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObserverFrame {
    /// No observer location; horizon-dependent quantities are undefined.
    Geocentric,
    /// Observer fixed to the Earth's surface.
    Topocentric {
        /// Latitude in decimal degrees (-90 to 90)
        latitude: f64,
        /// Longitude in decimal degrees (-180 to 180), positive east
        longitude: f64,
        /// Height above sea level in meters
        height_m: f64,
    },
}

impl ObserverFrame {
    /// Build a frame from optional coordinates.
    ///
    /// Both latitude and longitude must be present together or both absent;
    /// height defaults to 0 and is only checked for finiteness.
    pub fn build(
        latitude: Option<f64>,
        longitude: Option<f64>,
        height_m: Option<f64>,
    ) -> Result<Self, AstroError> {
        match (latitude, longitude) {
            (None, None) => Ok(ObserverFrame::Geocentric),
            (Some(_), None) | (None, Some(_)) => Err(AstroError::InvalidCoordinates(
                "latitude and longitude must be supplied together".to_string(),
            )),
            (Some(lat), Some(lon)) => {
                if !lat.is_finite() || !lon.is_finite() {
                    return Err(AstroError::InvalidCoordinates(
                        "coordinates must be finite numbers".to_string(),
                    ));
                }
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(AstroError::InvalidCoordinates(format!(
                        "latitude {lat} out of range; must be between -90 and 90 degrees"
                    )));
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(AstroError::InvalidCoordinates(format!(
                        "longitude {lon} out of range; must be between -180 and 180 degrees"
                    )));
                }
                let height = height_m.unwrap_or(0.0);
                if !height.is_finite() {
                    return Err(AstroError::InvalidCoordinates(
                        "height must be a finite number of meters".to_string(),
                    ));
                }
                Ok(ObserverFrame::Topocentric {
                    latitude: lat,
                    longitude: lon,
                    height_m: height,
                })
            }
        }
    }

    pub fn is_topocentric(&self) -> bool {
        matches!(self, ObserverFrame::Topocentric { .. })
    }
}

/// Normalize an angle to [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Wrap an angle to (-180, 180].
pub fn wrap_pm180(deg: f64) -> f64 {
    let w = deg.rem_euclid(360.0);
    if w > 180.0 { w - 360.0 } else { w }
}

/// Greenwich mean sidereal time in degrees at a UT Julian date.
pub fn gmst_deg(jd_ut: f64) -> f64 {
    let t = (jd_ut - 2_451_545.0) / 36_525.0;
    normalize_degrees(
        280.460_618_37
            + 360.985_647_366_29 * (jd_ut - 2_451_545.0)
            + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

/// Local sidereal time in degrees for an east-positive longitude.
pub fn local_sidereal_deg(jd_ut: f64, longitude_deg: f64) -> f64 {
    normalize_degrees(gmst_deg(jd_ut) + longitude_deg)
}

/// Ecliptic → equatorial conversion; returns (RA, Dec) in degrees.
pub fn ecliptic_to_equatorial(lon_deg: f64, lat_deg: f64, obliquity_deg: f64) -> (f64, f64) {
    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();
    let eps = obliquity_deg.to_radians();

    let ra = (lon.sin() * eps.cos() - lat.tan() * eps.sin()).atan2(lon.cos());
    let dec = (lat.sin() * eps.cos() + lat.cos() * eps.sin() * lon.sin()).asin();

    (normalize_degrees(ra.to_degrees()), dec.to_degrees())
}

/// Equatorial → horizontal conversion.
///
/// Returns (altitude, azimuth) in degrees, azimuth measured from north
/// through east.
pub fn equatorial_to_horizontal(
    ra_deg: f64,
    dec_deg: f64,
    lst_deg: f64,
    latitude_deg: f64,
) -> (f64, f64) {
    let ha = (lst_deg - ra_deg).to_radians();
    let dec = dec_deg.to_radians();
    let lat = latitude_deg.to_radians();

    let alt = (lat.sin() * dec.sin() + lat.cos() * dec.cos() * ha.cos()).asin();
    // Azimuth from south, converted to the from-north convention
    let az = ha
        .sin()
        .atan2(ha.cos() * lat.sin() - dec.tan() * lat.cos());
    let az_deg = normalize_degrees(az.to_degrees() + 180.0);

    (alt.to_degrees(), az_deg)
}

/// Topocentric parallax correction for a nearby body (the Moon).
///
/// Simplified spherical-Earth form of the rigorous reduction; returns the
/// topocentric (RA, Dec) in degrees.
pub fn apply_parallax(
    ra_deg: f64,
    dec_deg: f64,
    distance_km: f64,
    latitude_deg: f64,
    height_m: f64,
    lst_deg: f64,
) -> (f64, f64) {
    let lat = latitude_deg.to_radians();
    let rho = 1.0 + height_m / 6_378_140.0;
    let rho_sin_phi = rho * lat.sin();
    let rho_cos_phi = rho * lat.cos();

    let sin_pi = EARTH_RADIUS_KM / distance_km;
    let ha = (lst_deg - ra_deg).to_radians();
    let dec = dec_deg.to_radians();

    let delta_ra = (-rho_cos_phi * sin_pi * ha.sin())
        .atan2(dec.cos() - rho_cos_phi * sin_pi * ha.cos());
    let dec_topo = ((dec.sin() - rho_sin_phi * sin_pi) * delta_ra.cos())
        .atan2(dec.cos() - rho_cos_phi * sin_pi * ha.cos());

    (
        normalize_degrees(ra_deg + delta_ra.to_degrees()),
        dec_topo.to_degrees(),
    )
}

/// Atmospheric refraction in degrees for an apparent altitude (Bennett).
///
/// Returns 0 below -1°; the correction is added to the computed altitude.
pub fn refraction_deg(altitude_deg: f64) -> f64 {
    if altitude_deg < -1.0 {
        return 0.0;
    }
    let h = altitude_deg.max(0.0);
    let r_arcmin = 1.02 / ((h + 10.3 / (h + 5.11)).to_radians()).tan();
    r_arcmin / 60.0
}
