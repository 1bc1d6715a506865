//! Geocentric Sun and Mars positions from the VSOP87D heliocentric series.
//!
//! The Sun's geocentric position is the Earth's heliocentric position
//! reversed; Mars is the heliocentric difference of the two bodies, with a
//! light-travel-time iteration so the reported direction is where the planet
//! *appears*, not where it is geometrically.

use vsop87::vsop87d;

use super::frames::normalize_degrees;
use super::EclipticPosition;

/// Astronomical unit in km (IAU 2012 definition).
pub const AU_KM: f64 = 149_597_870.7;

/// Speed of light in km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Heliocentric rectangular ecliptic coordinates in AU.
fn rectangular(lon_rad: f64, lat_rad: f64, dist_au: f64) -> [f64; 3] {
    [
        dist_au * lat_rad.cos() * lon_rad.cos(),
        dist_au * lat_rad.cos() * lon_rad.sin(),
        dist_au * lat_rad.sin(),
    ]
}

fn earth_rect(jd_tdb: f64) -> [f64; 3] {
    let c = vsop87d::earth(jd_tdb);
    rectangular(c.longitude(), c.latitude(), c.distance())
}

fn mars_rect(jd_tdb: f64) -> [f64; 3] {
    let c = vsop87d::mars(jd_tdb);
    rectangular(c.longitude(), c.latitude(), c.distance())
}

/// Geocentric ecliptic position of the Sun (equinox of date).
pub fn sun_geocentric(jd_tdb: f64) -> EclipticPosition {
    let c = vsop87d::earth(jd_tdb);
    EclipticPosition {
        lon_deg: normalize_degrees(c.longitude().to_degrees() + 180.0),
        lat_deg: -c.latitude().to_degrees(),
        distance_km: c.distance() * AU_KM,
    }
}

/// Speed of light in AU per day.
const C_AU_PER_DAY: f64 = 173.144_632_674;

/// Earth heliocentric velocity in AU/day by central difference, for the
/// annual-aberration correction.
fn earth_velocity(jd_tdb: f64) -> [f64; 3] {
    let before = earth_rect(jd_tdb - 0.5);
    let after = earth_rect(jd_tdb + 0.5);
    [after[0] - before[0], after[1] - before[1], after[2] - before[2]]
}

/// Geocentric ecliptic position of Mars (equinox of date): apparent
/// direction, antedated for light-travel time and corrected for annual
/// aberration.
pub fn mars_geocentric(jd_tdb: f64) -> EclipticPosition {
    let earth = earth_rect(jd_tdb);

    // First pass: geometric position fixes the light-time estimate
    let mut tau_days = 0.0;
    let mut geo = [0.0; 3];
    for _ in 0..2 {
        let mars = mars_rect(jd_tdb - tau_days);
        geo = [mars[0] - earth[0], mars[1] - earth[1], mars[2] - earth[2]];
        let dist_au = (geo[0] * geo[0] + geo[1] * geo[1] + geo[2] * geo[2]).sqrt();
        tau_days = dist_au * AU_KM / SPEED_OF_LIGHT_KM_S / 86_400.0;
    }

    let dist_au = (geo[0] * geo[0] + geo[1] * geo[1] + geo[2] * geo[2]).sqrt();

    // First-order annual aberration: tilt the unit direction by v/c
    let v = earth_velocity(jd_tdb);
    let u = [
        geo[0] / dist_au + v[0] / C_AU_PER_DAY,
        geo[1] / dist_au + v[1] / C_AU_PER_DAY,
        geo[2] / dist_au + v[2] / C_AU_PER_DAY,
    ];
    let u_norm = (u[0] * u[0] + u[1] * u[1] + u[2] * u[2]).sqrt();

    EclipticPosition {
        lon_deg: normalize_degrees(u[1].atan2(u[0]).to_degrees()),
        lat_deg: (u[2] / u_norm).asin().to_degrees(),
        distance_km: dist_au * AU_KM,
    }
}

/// Heliocentric distances in AU for (Sun–Mars, Sun–Earth), used by the
/// magnitude model.
pub fn heliocentric_distances_au(jd_tdb: f64) -> (f64, f64) {
    (vsop87d::mars(jd_tdb).distance(), vsop87d::earth(jd_tdb).distance())
}
