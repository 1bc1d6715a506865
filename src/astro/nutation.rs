//! Nutation in longitude/obliquity and the obliquity of the ecliptic.
//!
//! Truncated IAU 1980 series: the four dominant terms give Δψ to ~0.5″ and
//! Δε to ~0.1″, well inside the accuracy of the periodic-term ephemeris
//! feeding it.

/// Nutation components in degrees.
#[derive(Debug, Clone, Copy)]
pub struct Nutation {
    /// Nutation in longitude Δψ
    pub dpsi_deg: f64,
    /// Nutation in obliquity Δε
    pub deps_deg: f64,
}

/// Evaluate the truncated nutation series at a TT Julian date.
pub fn nutation(jd_tt: f64) -> Nutation {
    let t = (jd_tt - 2_451_545.0) / 36_525.0;

    // Longitude of the Moon's ascending node
    let omega = (125.044_52 - 1_934.136_261 * t).to_radians();
    // Mean longitudes of the Sun and Moon
    let l_sun = (280.4665 + 36_000.7698 * t).to_radians();
    let l_moon = (218.3165 + 481_267.8813 * t).to_radians();

    let dpsi_arcsec = -17.20 * omega.sin()
        - 1.32 * (2.0 * l_sun).sin()
        - 0.23 * (2.0 * l_moon).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps_arcsec = 9.20 * omega.cos()
        + 0.57 * (2.0 * l_sun).cos()
        + 0.10 * (2.0 * l_moon).cos()
        - 0.09 * (2.0 * omega).cos();

    Nutation {
        dpsi_deg: dpsi_arcsec / 3_600.0,
        deps_deg: deps_arcsec / 3_600.0,
    }
}

/// Mean obliquity of the ecliptic in degrees.
pub fn mean_obliquity_deg(jd_tt: f64) -> f64 {
    let t = (jd_tt - 2_451_545.0) / 36_525.0;
    23.439_291 - 0.013_004_2 * t - 1.64e-7 * t * t + 5.04e-7 * t * t * t
}

/// True obliquity (mean + nutation in obliquity) in degrees.
pub fn true_obliquity_deg(jd_tt: f64) -> f64 {
    mean_obliquity_deg(jd_tt) + nutation(jd_tt).deps_deg
}
