//! Mars-specific calculator: brightness, solar geometry, seasons, and
//! horizon events.

use chrono::NaiveDate;

use crate::api::{
    AngularDiameter, BodyReport, HorizonEventInfo, MarsRiseSet, MarsSeasons, SunSeparation,
    TransitEventInfo,
};
use crate::astro::ephemeris::Ephemeris;
use crate::astro::events;
use crate::astro::solar::{self, AU_KM};
use crate::astro::timescales::{tdb_jd_to_utc, TimeContext};
use crate::astro::{AstroError, Body, ObserverFrame};

use super::observation::{format_utc, round2};

/// Mars sidereal year in Earth days, for the season approximation.
const MARS_YEAR_DAYS: f64 = 687.0;

/// Fill the Mars fields of a report.
pub fn enrich(
    eph: &Ephemeris,
    tc: &TimeContext,
    frame: &ObserverFrame,
    report: &mut BodyReport,
) -> Result<(), AstroError> {
    let jd = tc.jd_tdb().value();

    let mars = eph.mars_ecliptic(jd);
    let delta_au = mars.distance_km / AU_KM;

    report.magnitude = Some(round2(visual_magnitude(eph, jd)));
    report.angular_diameter = Some(AngularDiameter {
        // 6792 km equatorial diameter subtends 9.36" at 1 AU
        arcseconds: round2(9.36 / delta_au),
    });

    let separation = sun_separation_deg(eph, jd);
    report.sun_separation = Some(SunSeparation {
        degrees: round2(separation),
        opposition_proximity: round2((180.0 - separation).abs()),
    });
    report.special_position = special_position(separation);

    report.mars_seasons = Some(mars_seasons(tc));

    if let ObserverFrame::Topocentric {
        latitude,
        longitude,
        height_m,
    } = *frame
    {
        report.marsrise_and_set = Some(rise_set(eph, tc, latitude, longitude, height_m)?);
    }

    Ok(())
}

/// Visual magnitude from the heliocentric/geocentric distances and the
/// phase angle at Mars.
fn visual_magnitude(eph: &Ephemeris, jd_tdb: f64) -> f64 {
    let delta_au = eph.mars_ecliptic(jd_tdb).distance_km / AU_KM;
    let (r_mars, r_earth) = solar::heliocentric_distances_au(jd_tdb);

    // Sun-Mars-Earth angle by the law of cosines
    let cos_phase =
        (delta_au * delta_au + r_mars * r_mars - r_earth * r_earth) / (2.0 * delta_au * r_mars);
    let phase_angle = cos_phase.clamp(-1.0, 1.0).acos().to_degrees();

    -1.52 + 5.0 * (r_mars * delta_au).log10() + 0.016 * phase_angle
}

/// Geocentric angular separation between Mars and the Sun.
fn sun_separation_deg(eph: &Ephemeris, jd_tdb: f64) -> f64 {
    let mars = eph.mars_ecliptic(jd_tdb);
    let sun = eph.sun_ecliptic(jd_tdb);
    let dlon = (mars.lon_deg - sun.lon_deg).to_radians();
    let (mlat, slat) = (mars.lat_deg.to_radians(), sun.lat_deg.to_radians());
    let cos_sep = slat.sin() * mlat.sin() + slat.cos() * mlat.cos() * dlon.cos();
    cos_sep.clamp(-1.0, 1.0).acos().to_degrees()
}

fn special_position(separation_deg: f64) -> Option<String> {
    if (separation_deg - 180.0).abs() < 15.0 {
        Some("Near opposition (good for viewing)".to_string())
    } else if separation_deg < 15.0 {
        Some("Near conjunction (difficult to observe)".to_string())
    } else {
        None
    }
}

/// Mars year number and approximate areocentric solar longitude Ls.
///
/// Mars years count from the year beginning 1955-04-11; the season comes
/// from the Ls quadrant.
fn mars_seasons(tc: &TimeContext) -> MarsSeasons {
    let epoch = NaiveDate::from_ymd_opt(1955, 4, 11).expect("valid epoch date");
    let today = tc.utc().date_naive();
    let days_since_epoch = (today - epoch).num_days() as f64;
    let mars_years = days_since_epoch / MARS_YEAR_DAYS;

    let ls_deg = (mars_years.rem_euclid(1.0) * 360.0) % 360.0;
    let season = match ls_deg {
        x if x < 90.0 => "Northern Spring / Southern Autumn",
        x if x < 180.0 => "Northern Summer / Southern Winter",
        x if x < 270.0 => "Northern Autumn / Southern Spring",
        _ => "Northern Winter / Southern Summer",
    };

    MarsSeasons {
        mars_year: mars_years.floor() as i32 + 1,
        solar_longitude_deg: round2(ls_deg),
        season: season.to_string(),
    }
}

fn rise_set(
    eph: &Ephemeris,
    tc: &TimeContext,
    latitude: f64,
    longitude: f64,
    height_m: f64,
) -> Result<MarsRiseSet, AstroError> {
    let times = events::next_rise_set(eph, Body::Mars, tc, latitude, longitude, height_m)?;

    Ok(MarsRiseSet {
        next_marsrise: times.rise.map(|e| HorizonEventInfo {
            time: format_utc(tdb_jd_to_utc(e.jd_tdb)),
            azimuth_degrees: round2(e.azimuth_deg),
            illumination_percent: None,
            magnitude: Some(round2(visual_magnitude(eph, e.jd_tdb))),
        }),
        next_marsset: times.set.map(|e| HorizonEventInfo {
            time: format_utc(tdb_jd_to_utc(e.jd_tdb)),
            azimuth_degrees: round2(e.azimuth_deg),
            illumination_percent: None,
            magnitude: Some(round2(visual_magnitude(eph, e.jd_tdb))),
        }),
        next_transit: times.transit.map(|t| TransitEventInfo {
            time: format_utc(tdb_jd_to_utc(t.jd_tdb)),
            altitude_degrees: round2(t.altitude_deg),
            azimuth_degrees: round2(t.azimuth_deg),
            illumination_percent: None,
            magnitude: Some(round2(visual_magnitude(eph, t.jd_tdb))),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn eph() -> Ephemeris {
        Ephemeris::compact()
    }

    fn tc(y: i32, mo: u32, d: u32) -> TimeContext {
        TimeContext::from_utc(Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_magnitude_bright_at_close_approach() {
        // 2003-08-27: Mars near its brightest, about magnitude -2.9
        let jd = tc(2003, 8, 27).jd_tdb().value();
        let mag = visual_magnitude(&eph(), jd);
        assert!((-3.2..=-2.4).contains(&mag), "magnitude {mag}");
    }

    #[test]
    fn test_magnitude_realistic_range() {
        // Mars stays between about -3.0 and +2.0
        let eph = eph();
        for k in 0..24 {
            let jd = 2_451_545.0 + 60.0 * k as f64;
            let mag = visual_magnitude(&eph, jd);
            assert!((-3.5..=2.5).contains(&mag), "step {k}: magnitude {mag}");
        }
    }

    #[test]
    fn test_opposition_at_close_approach() {
        // The 2003 close approach coincided with opposition
        let jd = tc(2003, 8, 27).jd_tdb().value();
        let sep = sun_separation_deg(&eph(), jd);
        assert!(sep > 165.0, "separation {sep}° at opposition");
        assert_eq!(
            special_position(sep).as_deref(),
            Some("Near opposition (good for viewing)")
        );
    }

    #[test]
    fn test_special_position_thresholds() {
        assert!(special_position(90.0).is_none());
        assert_eq!(
            special_position(10.0).as_deref(),
            Some("Near conjunction (difficult to observe)")
        );
        assert_eq!(
            special_position(170.0).as_deref(),
            Some("Near opposition (good for viewing)")
        );
    }

    #[test]
    fn test_angular_diameter_at_close_approach() {
        // ~25" at the 2003 approach (0.3727 AU)
        let jd = tc(2003, 8, 27).jd_tdb().value();
        let delta_au = eph().mars_ecliptic(jd).distance_km / AU_KM;
        let arcsec = 9.36 / delta_au;
        assert!((24.0..26.5).contains(&arcsec), "diameter {arcsec}\"");
    }

    #[test]
    fn test_mars_seasons_sane() {
        let seasons = mars_seasons(&tc(2025, 3, 12));
        assert!((0.0..360.0).contains(&seasons.solar_longitude_deg));
        assert!(seasons.mars_year > 30 && seasons.mars_year < 45);
        assert!(seasons.season.contains("Northern"));
    }
}
