//! Shared body-report computation and assembly.
//!
//! One request flows through here sequentially: time normalization, frame
//! construction, the foundational position query, constellation resolution,
//! body-specific enrichment, then viewing conditions and metadata. Later
//! stages read earlier results, so there is no intra-request concurrency to
//! coordinate.

use chrono::{DateTime, Utc};

use crate::api::{
    AngleDual, BodyReport, CelestialCoordinates, Declination, DistanceInfo, GeographicLocation,
    ObservationRequest, PositionInfo, PrecisionInfo, RightAscension, TimeScales,
    ViewingConditions,
};
use crate::astro::ephemeris::{ApparentPosition, Ephemeris};
use crate::astro::solar::{AU_KM, SPEED_OF_LIGHT_KM_S};
use crate::astro::{constellation, AstroError, Body, ObserverFrame, TimeContext};

/// Timestamp rendering used throughout the payload.
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}

/// Compute the full report for one body.
pub fn compute_report(
    eph: &Ephemeris,
    body: Body,
    req: &ObservationRequest,
) -> Result<BodyReport, AstroError> {
    let tc = TimeContext::resolve(req.timestamp.as_deref())?;
    let frame = ObserverFrame::build(req.latitude, req.longitude, req.height)?;

    // Foundational position query; failure here aborts the request
    let pos = eph.position_of(body, &tc, &frame)?;

    // Both constellation names from the same RA/Dec pair; a catalog fault
    // degrades to the basic name inside the resolver
    let names = constellation::resolve(pos.ra_deg, pos.dec_deg, tc.jd_tt().value());

    let mut report = base_report(eph, body, &tc, &frame, &pos, &names);

    match body {
        Body::Moon => super::moon::enrich(eph, &tc, &frame, &mut report)?,
        Body::Mars => super::mars::enrich(eph, &tc, &frame, &mut report)?,
    }

    // Viewing conditions read the altitude and (for Mars) the opposition
    // note, so they assemble last
    report.viewing_conditions = viewing_conditions(body, &pos, report.special_position.as_deref());

    Ok(report)
}

fn base_report(
    eph: &Ephemeris,
    body: Body,
    tc: &TimeContext,
    frame: &ObserverFrame,
    pos: &ApparentPosition,
    names: &constellation::ConstellationNames,
) -> BodyReport {
    let position = match (pos.altitude_deg, pos.azimuth_deg) {
        (Some(alt), Some(az)) => Some(PositionInfo {
            altitude: AngleDual::from_degrees(alt),
            azimuth: AngleDual::from_degrees(az),
        }),
        _ => None,
    };

    let ra_hours = pos.ra_deg / 15.0;
    let au = pos.distance_km / AU_KM;

    let observer = match *frame {
        ObserverFrame::Geocentric => None,
        ObserverFrame::Topocentric {
            latitude,
            longitude,
            height_m,
        } => Some(GeographicLocation {
            latitude,
            longitude,
            height_m: Some(height_m),
        }),
    };

    BodyReport {
        name: body.name().to_string(),
        timestamp: format_utc(tc.utc()),
        position,
        celestial_coordinates: CelestialCoordinates {
            right_ascension: RightAscension {
                hours: round4(ra_hours),
                degrees: round4(pos.ra_deg),
            },
            declination: Declination {
                degrees: round4(pos.dec_deg),
            },
        },
        distance: DistanceInfo {
            km: pos.distance_km.round(),
            au: round6(au),
            light_seconds: round2(pos.distance_km / SPEED_OF_LIGHT_KM_S),
        },
        constellation: names.basic.clone(),
        constellation_precise: names.precise_or_basic().to_string(),
        current_phase: None,
        illumination_details: None,
        moon_age: None,
        phases: None,
        libration: None,
        moonrise_and_set: None,
        magnitude: None,
        angular_diameter: None,
        sun_separation: None,
        special_position: None,
        mars_seasons: None,
        marsrise_and_set: None,
        viewing_conditions: None,
        observer,
        time_scales: TimeScales {
            utc: format_utc(tc.utc()),
            tt_jd: tc.jd_tt().value(),
            tdb_jd: tc.jd_tdb().value(),
        },
        precision: precision_info(eph, body, frame),
    }
}

fn precision_info(eph: &Ephemeris, body: Body, frame: &ObserverFrame) -> PrecisionInfo {
    let mut corrections = vec!["light-travel-time".to_string(), "nutation".to_string()];
    if body == Body::Mars {
        corrections.push("annual-aberration".to_string());
    }
    if frame.is_topocentric() {
        if body == Body::Moon {
            corrections.push("topocentric-parallax".to_string());
        }
        corrections.push("atmospheric-refraction".to_string());
    }
    PrecisionInfo {
        ephemeris: eph.tier().ephemeris_id().to_string(),
        reference_frame: if frame.is_topocentric() {
            "geocentric equatorial (equinox of date) + topocentric horizontal".to_string()
        } else {
            "geocentric equatorial (equinox of date)".to_string()
        },
        corrections,
    }
}

/// Atmospheric extinction summary; present only for topocentric frames, and
/// the numeric fields only above the horizon.
fn viewing_conditions(
    body: Body,
    pos: &ApparentPosition,
    special_position: Option<&str>,
) -> Option<ViewingConditions> {
    let alt = pos.altitude_deg?;

    let (extinction, effect) = if alt > 0.0 {
        // Monotonically decreasing with altitude, capped low on the horizon
        let magnitudes = (0.28 / alt.to_radians().sin()).min(5.0);
        (
            Some(round2(magnitudes)),
            Some(format!("{:.1}% dimming", (magnitudes * 100.0 * 10.0).round() / 10.0)),
        )
    } else {
        (None, None)
    };

    let mut note = "Around transit (highest altitude)".to_string();
    if body == Body::Mars && special_position == Some("Near opposition (good for viewing)") {
        note.push_str(" (currently near opposition, excellent viewing)");
    }

    Some(ViewingConditions {
        atmospheric_extinction: extinction,
        extinction_effect: effect,
        best_viewing_time: note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::ephemeris::ApparentPosition;

    fn pos_at(alt: Option<f64>) -> ApparentPosition {
        ApparentPosition {
            ra_deg: 100.0,
            dec_deg: 10.0,
            distance_km: 384_400.0,
            altitude_deg: alt,
            azimuth_deg: alt.map(|_| 120.0),
        }
    }

    #[test]
    fn test_viewing_conditions_absent_for_geocentric() {
        assert!(viewing_conditions(Body::Moon, &pos_at(None), None).is_none());
    }

    #[test]
    fn test_viewing_conditions_below_horizon() {
        let vc = viewing_conditions(Body::Moon, &pos_at(Some(-10.0)), None).unwrap();
        assert!(vc.atmospheric_extinction.is_none());
        assert!(vc.extinction_effect.is_none());
        assert!(vc.best_viewing_time.contains("transit"));
    }

    #[test]
    fn test_extinction_decreases_with_altitude() {
        let low = viewing_conditions(Body::Moon, &pos_at(Some(5.0)), None)
            .unwrap()
            .atmospheric_extinction
            .unwrap();
        let high = viewing_conditions(Body::Moon, &pos_at(Some(70.0)), None)
            .unwrap()
            .atmospheric_extinction
            .unwrap();
        assert!(low > high, "extinction {low} at 5° vs {high} at 70°");
        assert!(high < 0.4);
        assert!(low <= 5.0);
    }

    #[test]
    fn test_extinction_capped_near_horizon() {
        let vc = viewing_conditions(Body::Mars, &pos_at(Some(0.5)), None).unwrap();
        assert_eq!(vc.atmospheric_extinction.unwrap(), 5.0);
    }

    #[test]
    fn test_opposition_note_appended() {
        let vc = viewing_conditions(
            Body::Mars,
            &pos_at(Some(30.0)),
            Some("Near opposition (good for viewing)"),
        )
        .unwrap();
        assert!(vc.best_viewing_time.contains("excellent viewing"));

        let vc = viewing_conditions(Body::Moon, &pos_at(Some(30.0)), None).unwrap();
        assert!(!vc.best_viewing_time.contains("excellent"));
    }

    #[test]
    fn test_format_utc() {
        let dt = chrono::DateTime::parse_from_rfc3339("2025-03-12T00:00:22Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(format_utc(dt), "2025-03-12 00:00:22 UTC");
    }
}
