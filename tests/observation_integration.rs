//! End-to-end service-level tests: full reports for both bodies, field
//! presence rules, and the documented request scenarios.

use chrono::NaiveDateTime;

use skywatch::api::ObservationRequest;
use skywatch::astro::{AstroError, Body, Ephemeris};
use skywatch::services::compute_report;

fn located_request(timestamp: &str) -> ObservationRequest {
    ObservationRequest {
        latitude: Some(35.7478),
        longitude: Some(-95.3697),
        height: None,
        timestamp: Some(timestamp.to_string()),
    }
}

fn bare_request(timestamp: &str) -> ObservationRequest {
    ObservationRequest {
        timestamp: Some(timestamp.to_string()),
        ..Default::default()
    }
}

fn parse_payload_time(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s.trim_end_matches(" UTC"), "%Y-%m-%d %H:%M:%S").unwrap()
}

#[test]
fn moon_phase_near_zero_at_catalogued_new_moon() {
    // 2000-01-06 18:14 UTC is a catalogued new moon
    let eph = Ephemeris::load();
    let report = compute_report(&eph, Body::Moon, &bare_request("2000-01-06 18:14:00")).unwrap();
    let phase = report.current_phase.unwrap();
    assert!(phase < 0.5, "current_phase = {phase} at new moon");

    // Moon age resets at the new moon
    let age = report.moon_age.unwrap();
    assert!(age.days < 1.0 || age.days > 29.0, "age {} days", age.days);
}

#[test]
fn geocentric_request_omits_observer_dependent_fields() {
    let eph = Ephemeris::load();

    let moon = compute_report(&eph, Body::Moon, &bare_request("2025-03-12 00:00:22")).unwrap();
    assert!(moon.position.is_none());
    assert!(moon.observer.is_none());
    assert!(moon.viewing_conditions.is_none());
    assert!(moon.moonrise_and_set.is_none());
    // Location-independent fields still present
    assert!(moon.current_phase.is_some());
    assert!(moon.phases.is_some());
    assert!(moon.libration.is_some());
    assert!(moon.moon_age.is_some());

    let mars = compute_report(&eph, Body::Mars, &bare_request("2025-03-12 00:00:22")).unwrap();
    assert!(mars.position.is_none());
    assert!(mars.observer.is_none());
    assert!(mars.viewing_conditions.is_none());
    assert!(mars.marsrise_and_set.is_none());
    assert!(mars.magnitude.is_some());
    assert!(mars.sun_separation.is_some());
    assert!(mars.mars_seasons.is_some());
}

#[test]
fn located_moon_request_reports_rise_set_and_echo() {
    let eph = Ephemeris::load();
    let request_time = "2025-03-12 00:00:22";
    let report = compute_report(&eph, Body::Moon, &located_request(request_time)).unwrap();

    let observer = report.observer.expect("observer echo present");
    assert_eq!(observer.latitude, 35.7478);
    assert_eq!(observer.longitude, -95.3697);

    let rise_set = report.moonrise_and_set.expect("moonrise_and_set present");
    let rise = rise_set.next_moonrise.expect("moonrise at mid-latitude");
    let set = rise_set.next_moonset.expect("moonset at mid-latitude");
    let transit = rise_set.next_transit.expect("transit at mid-latitude");

    let t0 = parse_payload_time(&format!("{request_time} UTC"));
    for time in [&rise.time, &set.time, &transit.time] {
        assert!(
            parse_payload_time(time) > t0,
            "event time {time} not after request"
        );
    }

    // Moon events carry illumination, not magnitude
    assert!(rise.illumination_percent.is_some());
    assert!(rise.magnitude.is_none());
    assert!((0.0..=100.0).contains(&rise.illumination_percent.unwrap()));

    // Transit reports the peak geometry
    assert!((-90.0..=90.0).contains(&transit.altitude_degrees));
    assert!((0.0..360.0).contains(&transit.azimuth_degrees));

    // Position block present with consistent dual rendering
    let position = report.position.expect("position present");
    let alt = &position.altitude;
    let parts: Vec<&str> = alt.dms.trim_start_matches('-').split(':').collect();
    let reparsed = parts[0].parse::<f64>().unwrap()
        + parts[1].parse::<f64>().unwrap() / 60.0
        + parts[2].parse::<f64>().unwrap() / 3_600.0;
    let reparsed = if alt.dms.starts_with('-') { -reparsed } else { reparsed };
    assert!(
        (reparsed - alt.degrees).abs() < 0.01,
        "dms {} vs degrees {}",
        alt.dms,
        alt.degrees
    );
}

#[test]
fn located_mars_request_reports_rise_set_with_magnitude() {
    let eph = Ephemeris::load();
    let report = compute_report(&eph, Body::Mars, &located_request("2025-03-12 00:00:22")).unwrap();

    let rise_set = report.marsrise_and_set.expect("marsrise_and_set present");
    let rise = rise_set.next_marsrise.expect("marsrise at mid-latitude");
    assert!(rise.magnitude.is_some());
    assert!(rise.illumination_percent.is_none());

    // Moon-only fields must be absent from a Mars report
    assert!(report.current_phase.is_none());
    assert!(report.moon_age.is_none());
    assert!(report.libration.is_none());
    assert!(report.moonrise_and_set.is_none());
}

#[test]
fn out_of_range_latitude_rejected_before_computation() {
    let eph = Ephemeris::load();
    let request = ObservationRequest {
        latitude: Some(95.0),
        longitude: Some(0.0),
        height: None,
        timestamp: None,
    };
    let err = compute_report(&eph, Body::Moon, &request).unwrap_err();
    match err {
        AstroError::InvalidCoordinates(msg) => {
            assert!(msg.contains("-90 and 90"), "message: {msg}")
        }
        other => panic!("expected InvalidCoordinates, got {other:?}"),
    }
}

#[test]
fn lone_longitude_rejected() {
    let eph = Ephemeris::load();
    let request = ObservationRequest {
        longitude: Some(12.0),
        ..Default::default()
    };
    let err = compute_report(&eph, Body::Mars, &request).unwrap_err();
    assert!(matches!(err, AstroError::InvalidCoordinates(_)));
}

#[test]
fn unparseable_timestamp_rejected() {
    let eph = Ephemeris::load();
    let err = compute_report(&eph, Body::Moon, &bare_request("the ides of March")).unwrap_err();
    assert!(matches!(err, AstroError::InvalidTimestamp(_)));
}

#[test]
fn phase_events_bracket_the_request_time() {
    let eph = Ephemeris::load();
    let request_time = "2026-06-15 12:00:00";
    let report = compute_report(&eph, Body::Moon, &bare_request(request_time)).unwrap();
    let phases = report.phases.unwrap();

    assert_eq!(phases.previous.len(), 2);
    assert_eq!(phases.next.len(), 2);

    let t0 = parse_payload_time(&format!("{request_time} UTC"));
    for event in &phases.previous {
        assert!(
            parse_payload_time(&event.date) < t0,
            "previous event {} not before request",
            event.date
        );
    }
    for event in &phases.next {
        assert!(
            parse_payload_time(&event.date) >= t0,
            "next event {} before request",
            event.date
        );
    }

    // One of each kind on each side
    for list in [&phases.previous, &phases.next] {
        let kinds: Vec<&str> = list.iter().map(|e| e.phase.as_str()).collect();
        assert!(kinds.contains(&"New Moon") && kinds.contains(&"Full Moon"), "{kinds:?}");
    }
}

#[test]
fn distance_units_are_consistent() {
    let eph = Ephemeris::load();
    for body in [Body::Moon, Body::Mars] {
        let report = compute_report(&eph, body, &bare_request("2025-03-12 00:00:22")).unwrap();
        let d = &report.distance;
        assert!(
            (d.km / 149_597_870.7 - d.au).abs() < 1e-4,
            "{body}: km/au mismatch"
        );
        assert!(
            (d.km / 299_792.458 - d.light_seconds).abs() < 0.5,
            "{body}: light-time mismatch"
        );
    }
}

#[test]
fn metadata_reflects_frame_and_tier() {
    let eph = Ephemeris::load();

    let geo = compute_report(&eph, Body::Moon, &bare_request("2025-03-12 00:00:22")).unwrap();
    assert_eq!(geo.precision.ephemeris, "lunar-series-extended+vsop87d");
    assert!(!geo.precision.reference_frame.contains("topocentric"));
    assert!(geo.precision.corrections.iter().any(|c| c == "nutation"));

    let located = compute_report(&eph, Body::Moon, &located_request("2025-03-12 00:00:22")).unwrap();
    assert!(located.precision.reference_frame.contains("topocentric"));
    assert!(located
        .precision
        .corrections
        .iter()
        .any(|c| c == "topocentric-parallax"));
}

#[test]
fn timestamp_echo_round_trips() {
    let eph = Ephemeris::load();
    let report = compute_report(&eph, Body::Mars, &bare_request("2025-03-12 00:00:22")).unwrap();
    assert_eq!(report.timestamp, "2025-03-12 00:00:22 UTC");
    assert_eq!(report.time_scales.utc, report.timestamp);
    // TT runs ahead of UTC by ~69 s at this epoch
    let tt_minus_utc =
        (report.time_scales.tt_jd - skywatch::api::JulianDate::from_datetime(
            chrono::DateTime::parse_from_rfc3339("2025-03-12T00:00:22Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        )
        .value())
            * 86_400.0;
    assert!((tt_minus_utc - 69.184).abs() < 0.01, "TT-UTC = {tt_minus_utc}");
}
