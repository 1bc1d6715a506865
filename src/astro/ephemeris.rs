//! Tiered ephemeris provider.
//!
//! On construction the provider tries to load the extended lunar term table
//! from the dataset directory; if that fails it silently falls back to the
//! compiled-in compact series and records which tier is in use. Callers never
//! branch on the tier — it only surfaces in response metadata. Planetary and
//! solar positions always evaluate through the VSOP87D series.
//!
//! The provider applies light-travel-time antedating (Moon, Mars), nutation
//! in longitude, annual aberration (Mars), and — for topocentric frames —
//! parallax and refraction, yielding apparent coordinates of date.

use std::env;
use std::path::PathBuf;

use super::frames::{
    self, apply_parallax, equatorial_to_horizontal, local_sidereal_deg, refraction_deg,
    ObserverFrame,
};
use super::lunar::LunarSeries;
use super::nutation;
use super::solar::{self, SPEED_OF_LIGHT_KM_S};
use super::timescales::TimeContext;
use super::{AstroError, Body, EclipticPosition};

/// Validity window of the underlying series (years −2000 to +6000).
const SUPPORTED_JD: std::ops::RangeInclusive<f64> = 990_557.5..=3_912_545.5;

/// Environment variable overriding the dataset directory (default `data`).
pub const DATA_DIR_ENV: &str = "SKYWATCH_DATA_DIR";

/// Which lunar dataset the provider is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionTier {
    /// Extended term table parsed from the dataset directory.
    Extended,
    /// Compiled-in compact table (fallback).
    Compact,
}

impl PrecisionTier {
    /// Identifier surfaced in response metadata.
    pub fn ephemeris_id(&self) -> &'static str {
        match self {
            PrecisionTier::Extended => "lunar-series-extended+vsop87d",
            PrecisionTier::Compact => "lunar-series-compact+vsop87d",
        }
    }
}

/// Apparent position bundle returned by [`Ephemeris::position_of`].
#[derive(Debug, Clone, Copy)]
pub struct ApparentPosition {
    /// Apparent right ascension in degrees (equinox of date)
    pub ra_deg: f64,
    /// Apparent declination in degrees
    pub dec_deg: f64,
    /// Geocentric distance in km
    pub distance_km: f64,
    /// Refraction-corrected altitude in degrees; `None` for geocentric frames
    pub altitude_deg: Option<f64>,
    /// Azimuth in degrees from north; `None` for geocentric frames
    pub azimuth_deg: Option<f64>,
}

/// Process-wide, read-only ephemeris state.
#[derive(Debug, Clone)]
pub struct Ephemeris {
    lunar: LunarSeries,
    tier: PrecisionTier,
}

/// Resolve the dataset directory from the environment.
pub fn data_dir() -> PathBuf {
    env::var(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

impl Ephemeris {
    /// Load the provider, preferring the extended dataset.
    ///
    /// A missing or unparseable term file degrades to the compact tier; the
    /// choice is logged once and recorded for response metadata.
    pub fn load() -> Self {
        let path = data_dir().join("lunar_terms.csv");
        match std::fs::read_to_string(&path).map_err(|e| e.to_string()).and_then(|contents| {
            LunarSeries::parse(&contents)
        }) {
            Ok(series) => {
                log::info!(
                    "loaded extended lunar term table from {} ({} terms)",
                    path.display(),
                    series.term_count()
                );
                Self {
                    lunar: series,
                    tier: PrecisionTier::Extended,
                }
            }
            Err(reason) => {
                log::warn!(
                    "extended lunar term table unavailable at {} ({reason}); using compact series",
                    path.display()
                );
                Self::compact()
            }
        }
    }

    /// Provider running on the compiled-in compact series.
    pub fn compact() -> Self {
        Self {
            lunar: LunarSeries::compact(),
            tier: PrecisionTier::Compact,
        }
    }

    pub fn tier(&self) -> PrecisionTier {
        self.tier
    }

    /// Geometric geocentric ecliptic position of the Moon.
    pub fn moon_ecliptic(&self, jd_tdb: f64) -> EclipticPosition {
        self.lunar.geocentric(jd_tdb)
    }

    /// Geometric geocentric ecliptic position of the Sun.
    pub fn sun_ecliptic(&self, jd_tdb: f64) -> EclipticPosition {
        solar::sun_geocentric(jd_tdb)
    }

    /// Apparent geocentric ecliptic position of Mars (light-time corrected).
    pub fn mars_ecliptic(&self, jd_tdb: f64) -> EclipticPosition {
        solar::mars_geocentric(jd_tdb)
    }

    /// Moon−Sun elongation in ecliptic longitude, degrees in [0, 360).
    ///
    /// 0 at new moon, 180 at full moon, increasing ~12.19°/day. Nutation
    /// cancels in the difference, so geometric longitudes are used.
    pub fn ecliptic_elongation_deg(&self, jd_tdb: f64) -> f64 {
        let moon = self.moon_ecliptic(jd_tdb);
        let sun = self.sun_ecliptic(jd_tdb);
        frames::normalize_degrees(moon.lon_deg - sun.lon_deg)
    }

    /// Great-circle Sun–Moon separation in degrees, [0, 180].
    pub fn angular_elongation_deg(&self, jd_tdb: f64) -> f64 {
        let moon = self.moon_ecliptic(jd_tdb);
        let sun = self.sun_ecliptic(jd_tdb);
        let dlon = (moon.lon_deg - sun.lon_deg).to_radians();
        let (mlat, slat) = (moon.lat_deg.to_radians(), sun.lat_deg.to_radians());
        let cos_e = slat.sin() * mlat.sin() + slat.cos() * mlat.cos() * dlon.cos();
        cos_e.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Apparent geocentric equatorial coordinates of date.
    ///
    /// Returns (RA°, Dec°, distance km). Used by `position_of` and by the
    /// rise/set search, which needs bare equatorial coordinates at arbitrary
    /// trial instants.
    pub fn apparent_equatorial(
        &self,
        body: Body,
        jd_tdb: f64,
        jd_tt: f64,
    ) -> Result<(f64, f64, f64), AstroError> {
        check_epoch(jd_tdb)?;

        let nut = nutation::nutation(jd_tt);
        let ecl = match body {
            Body::Moon => {
                // Antedate by light-travel time (~1.3 s)
                let geometric = self.lunar.geocentric(jd_tdb);
                let tau_days = geometric.distance_km / SPEED_OF_LIGHT_KM_S / 86_400.0;
                let mut pos = self.lunar.geocentric(jd_tdb - tau_days);
                pos.lon_deg = frames::normalize_degrees(pos.lon_deg + nut.dpsi_deg);
                pos
            }
            Body::Mars => {
                let mut pos = solar::mars_geocentric(jd_tdb);
                pos.lon_deg = frames::normalize_degrees(pos.lon_deg + nut.dpsi_deg);
                pos
            }
        };

        let eps = nutation::true_obliquity_deg(jd_tt);
        let (ra, dec) = frames::ecliptic_to_equatorial(ecl.lon_deg, ecl.lat_deg, eps);

        if !ra.is_finite() || !dec.is_finite() || !ecl.distance_km.is_finite() {
            return Err(AstroError::EphemerisUnavailable(format!(
                "series evaluation for {body} produced a non-finite result"
            )));
        }
        Ok((ra, dec, ecl.distance_km))
    }

    /// Position query: apparent RA/Dec/distance plus, for topocentric
    /// frames, parallax- and refraction-corrected altitude/azimuth.
    pub fn position_of(
        &self,
        body: Body,
        tc: &TimeContext,
        frame: &ObserverFrame,
    ) -> Result<ApparentPosition, AstroError> {
        let (ra, dec, distance_km) =
            self.apparent_equatorial(body, tc.jd_tdb().value(), tc.jd_tt().value())?;

        let (altitude_deg, azimuth_deg) = match *frame {
            ObserverFrame::Geocentric => (None, None),
            ObserverFrame::Topocentric {
                latitude,
                longitude,
                height_m,
            } => {
                let lst = local_sidereal_deg(tc.jd_utc().value(), longitude);
                // Parallax only matters for the Moon (~1°); planetary
                // parallax is below the series accuracy
                let (ra_t, dec_t) = if body == Body::Moon {
                    apply_parallax(ra, dec, distance_km, latitude, height_m, lst)
                } else {
                    (ra, dec)
                };
                let (alt, az) = equatorial_to_horizontal(ra_t, dec_t, lst, latitude);
                let alt = alt + refraction_deg(alt);
                (Some(alt), Some(az))
            }
        };

        Ok(ApparentPosition {
            ra_deg: ra,
            dec_deg: dec,
            distance_km,
            altitude_deg,
            azimuth_deg,
        })
    }
}

fn check_epoch(jd_tdb: f64) -> Result<(), AstroError> {
    if !jd_tdb.is_finite() || !SUPPORTED_JD.contains(&jd_tdb) {
        return Err(AstroError::EphemerisUnavailable(format!(
            "epoch JD {jd_tdb} outside the supported range of the loaded series"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> TimeContext {
        TimeContext::from_utc(Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap())
    }

    #[test]
    fn test_compact_tier_id() {
        let eph = Ephemeris::compact();
        assert_eq!(eph.tier().ephemeris_id(), "lunar-series-compact+vsop87d");
    }

    #[test]
    fn test_position_geocentric_has_no_horizontal() {
        let eph = Ephemeris::compact();
        let t = tc(2025, 3, 12, 0, 0, 22);
        let pos = eph
            .position_of(Body::Moon, &t, &ObserverFrame::Geocentric)
            .unwrap();
        assert!(pos.altitude_deg.is_none());
        assert!(pos.azimuth_deg.is_none());
        assert!((0.0..360.0).contains(&pos.ra_deg));
        assert!((-90.0..=90.0).contains(&pos.dec_deg));
    }

    #[test]
    fn test_position_topocentric_has_horizontal() {
        let eph = Ephemeris::compact();
        let t = tc(2025, 3, 12, 0, 0, 22);
        let frame = ObserverFrame::build(Some(35.7478), Some(-95.3697), None).unwrap();
        for body in [Body::Moon, Body::Mars] {
            let pos = eph.position_of(body, &t, &frame).unwrap();
            let alt = pos.altitude_deg.unwrap();
            let az = pos.azimuth_deg.unwrap();
            assert!((-90.0..=90.5).contains(&alt), "{body}: alt {alt}");
            assert!((0.0..360.0).contains(&az), "{body}: az {az}");
        }
    }

    #[test]
    fn test_epoch_guard() {
        let eph = Ephemeris::compact();
        let ancient = TimeContext::from_utc(
            Utc.with_ymd_and_hms(-3500, 1, 1, 0, 0, 0).unwrap(),
        );
        let err = eph
            .position_of(Body::Mars, &ancient, &ObserverFrame::Geocentric)
            .unwrap_err();
        assert!(matches!(err, AstroError::EphemerisUnavailable(_)));
    }

    #[test]
    fn test_elongation_consistency() {
        // Ecliptic and angular elongation agree within the Moon's latitude
        let eph = Ephemeris::compact();
        for k in 0..15 {
            let jd = 2_460_000.5 + 2.0 * k as f64;
            let ecl = eph.ecliptic_elongation_deg(jd);
            let ang = eph.angular_elongation_deg(jd);
            let folded = if ecl > 180.0 { 360.0 - ecl } else { ecl };
            assert!(
                (folded - ang).abs() < 6.0,
                "jd {jd}: ecliptic {folded} vs angular {ang}"
            );
        }
    }

    #[test]
    fn test_elongation_advances() {
        let eph = Ephemeris::compact();
        let jd = 2_460_100.5;
        let d0 = eph.ecliptic_elongation_deg(jd);
        let d1 = eph.ecliptic_elongation_deg(jd + 1.0);
        let advance = (d1 - d0).rem_euclid(360.0);
        // Mean synodic rate is ~12.19°/day
        assert!((10.0..15.0).contains(&advance), "advance {advance}°/day");
    }

    #[test]
    fn test_moon_parallax_visible_topocentric() {
        // Topocentric Moon altitude differs from the naive geocentric
        // transform by up to ~1°; verify the correction is actually wired in
        let eph = Ephemeris::compact();
        let t = tc(2025, 6, 1, 3, 0, 0);
        let frame = ObserverFrame::build(Some(48.0), Some(2.0), None).unwrap();
        let pos = eph.position_of(Body::Moon, &t, &frame).unwrap();

        let lst = local_sidereal_deg(t.jd_utc().value(), 2.0);
        let (alt_geo, _) = equatorial_to_horizontal(pos.ra_deg, pos.dec_deg, lst, 48.0);
        let alt_topo = pos.altitude_deg.unwrap();
        assert!(
            (alt_geo - alt_topo).abs() < 1.6,
            "parallax+refraction displacement {} out of bounds",
            (alt_geo - alt_topo).abs()
        );
    }
}
