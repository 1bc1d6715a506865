//! Moon-specific calculator: phase, age, phase events, libration, and
//! horizon events.

use crate::api::{
    BodyReport, HorizonEventInfo, IlluminationDetails, LibrationInfo, MoonAge, MoonRiseSet,
    PhaseEventInfo, PhaseTimeline, TransitEventInfo,
};
use crate::astro::ephemeris::Ephemeris;
use crate::astro::events::{self, PhaseEvent};
use crate::astro::frames::wrap_pm180;
use crate::astro::lunar::LunarSeries;
use crate::astro::timescales::{tdb_jd_to_utc, TimeContext};
use crate::astro::{AstroError, Body, ObserverFrame};

use super::observation::{format_utc, round2};

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_589;

/// Inclination of the mean lunar equator to the ecliptic.
const LUNAR_EQUATOR_INCLINATION_DEG: f64 = 1.542_42;

/// Fill the Moon fields of a report.
pub fn enrich(
    eph: &Ephemeris,
    tc: &TimeContext,
    frame: &ObserverFrame,
    report: &mut BodyReport,
) -> Result<(), AstroError> {
    let jd = tc.jd_tdb().value();

    // Phase percentage and the geometry behind it: the illuminated
    // fraction is (1 + cos(phase angle)) / 2, zero when the phase angle is
    // 180° (new) and one when it is 0° (full)
    let elongation = eph.angular_elongation_deg(jd);
    let phase_angle = 180.0 - elongation;
    let illuminated = (1.0 + phase_angle.to_radians().cos()) / 2.0;
    report.current_phase = Some(round2(illuminated * 100.0));
    report.illumination_details = Some(IlluminationDetails {
        elongation_degrees: round2(elongation),
        phase_angle_degrees: round2(phase_angle),
        illuminated_fraction: (illuminated * 10_000.0).round() / 10_000.0,
        illuminated_percentage: round2(illuminated * 100.0),
    });

    // Phase events around the request instant
    let window = events::phase_window(eph, jd);
    let age_days = jd - window.previous_new.jd_tdb;
    report.moon_age = Some(MoonAge {
        days: round2(age_days),
        percentage_of_cycle: round2(age_days / SYNODIC_MONTH_DAYS * 100.0),
    });
    report.phases = Some(phase_timeline(&window));

    // A libration fault degrades to an omitted field, never a failed request
    report.libration = libration(eph, jd);
    if report.libration.is_none() {
        log::warn!("libration approximation failed at JD {jd}; omitting field");
    }

    if let ObserverFrame::Topocentric {
        latitude,
        longitude,
        height_m,
    } = *frame
    {
        report.moonrise_and_set = Some(rise_set(eph, tc, latitude, longitude, height_m)?);
    }

    Ok(())
}

fn phase_event_info(event: &PhaseEvent) -> PhaseEventInfo {
    PhaseEventInfo {
        phase: event.kind.label().to_string(),
        date: format_utc(tdb_jd_to_utc(event.jd_tdb)),
    }
}

/// Previous and next events, each list in chronological order.
fn phase_timeline(window: &events::PhaseWindow) -> PhaseTimeline {
    let mut previous = [window.previous_new, window.previous_full];
    previous.sort_by(|a, b| a.jd_tdb.total_cmp(&b.jd_tdb));
    let mut next = [window.next_new, window.next_full];
    next.sort_by(|a, b| a.jd_tdb.total_cmp(&b.jd_tdb));

    PhaseTimeline {
        previous: previous.iter().map(phase_event_info).collect(),
        next: next.iter().map(phase_event_info).collect(),
    }
}

/// Simplified optical libration from the mean node, the argument of
/// latitude, and the Moon's geocentric ecliptic position. Physical
/// libration is ignored, which the payload note states.
fn libration(eph: &Ephemeris, jd_tdb: f64) -> Option<LibrationInfo> {
    let moon = eph.moon_ecliptic(jd_tdb);
    let inclination = LUNAR_EQUATOR_INCLINATION_DEG.to_radians();
    let node = LunarSeries::ascending_node_deg(jd_tdb);
    let arg_latitude = LunarSeries::argument_of_latitude_deg(jd_tdb);

    let w = (moon.lon_deg - node).to_radians();
    let beta = moon.lat_deg.to_radians();

    let a = (w.sin() * beta.cos() * inclination.cos() - beta.sin() * inclination.sin())
        .atan2(w.cos() * beta.cos());
    let lon_libration = wrap_pm180(a.to_degrees() - arg_latitude);
    let lat_libration = (-w.sin() * beta.cos() * inclination.sin() - beta.sin() * inclination.cos())
        .asin()
        .to_degrees();
    let position_angle = lat_libration.atan2(lon_libration).to_degrees();

    if !lon_libration.is_finite() || !lat_libration.is_finite() || !position_angle.is_finite() {
        return None;
    }

    Some(LibrationInfo {
        longitude_degrees: round2(lon_libration),
        latitude_degrees: round2(lat_libration),
        position_angle_degrees: round2(position_angle),
        note: "Simplified optical libration approximation".to_string(),
    })
}

/// Illuminated percentage at an arbitrary instant, for horizon events.
fn illumination_percent_at(eph: &Ephemeris, jd_tdb: f64) -> f64 {
    let phase_angle = 180.0 - eph.angular_elongation_deg(jd_tdb);
    round2((1.0 + phase_angle.to_radians().cos()) / 2.0 * 100.0)
}

fn rise_set(
    eph: &Ephemeris,
    tc: &TimeContext,
    latitude: f64,
    longitude: f64,
    height_m: f64,
) -> Result<MoonRiseSet, AstroError> {
    let times = events::next_rise_set(eph, Body::Moon, tc, latitude, longitude, height_m)?;

    Ok(MoonRiseSet {
        next_moonrise: times.rise.map(|e| HorizonEventInfo {
            time: format_utc(tdb_jd_to_utc(e.jd_tdb)),
            azimuth_degrees: round2(e.azimuth_deg),
            illumination_percent: Some(illumination_percent_at(eph, e.jd_tdb)),
            magnitude: None,
        }),
        next_moonset: times.set.map(|e| HorizonEventInfo {
            time: format_utc(tdb_jd_to_utc(e.jd_tdb)),
            azimuth_degrees: round2(e.azimuth_deg),
            illumination_percent: Some(illumination_percent_at(eph, e.jd_tdb)),
            magnitude: None,
        }),
        next_transit: times.transit.map(|t| TransitEventInfo {
            time: format_utc(tdb_jd_to_utc(t.jd_tdb)),
            altitude_degrees: round2(t.altitude_deg),
            azimuth_degrees: round2(t.azimuth_deg),
            illumination_percent: Some(illumination_percent_at(eph, t.jd_tdb)),
            magnitude: None,
        }),
    })
}
