//! Handler-level HTTP tests: response shapes and error payloads.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;

use skywatch::astro::Ephemeris;
use skywatch::http::{handlers, AppState};

fn state() -> State<AppState> {
    State(AppState::new(Arc::new(Ephemeris::load())))
}

async fn response_json(response: axum::response::Response) -> (u16, serde_json::Value) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_dataset() {
    let response = handlers::health_check(state()).await.unwrap();
    let health = response.0;
    assert_eq!(health.status, "ok");
    assert_eq!(health.ephemeris, "lunar-series-extended+vsop87d");
}

#[tokio::test]
async fn moon_report_empty_body_is_geocentric() {
    let response = handlers::moon_report(state(), String::new()).await.unwrap();
    let report = response.0;
    assert_eq!(report.name, "moon");
    assert!(report.observer.is_none());
    assert!(report.position.is_none());
    assert!(report.current_phase.is_some());
}

#[tokio::test]
async fn mars_report_with_location() {
    let body = r#"{"latitude": 35.7478, "longitude": -95.3697, "timestamp": "2025-03-12 00:00:22"}"#;
    let response = handlers::mars_report(state(), body.to_string()).await.unwrap();
    let report = response.0;
    assert_eq!(report.name, "mars");
    assert!(report.marsrise_and_set.is_some());
    let observer = report.observer.unwrap();
    assert_eq!(observer.latitude, 35.7478);
}

#[tokio::test]
async fn out_of_range_latitude_yields_error_payload() {
    let body = r#"{"latitude": 95, "longitude": 0}"#;
    let err = handlers::moon_report(state(), body.to_string())
        .await
        .unwrap_err();
    let (status, json) = response_json(err.into_response()).await;
    assert_eq!(status, 400);
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("-90 and 90"), "message: {message}");
}

#[tokio::test]
async fn malformed_json_yields_error_payload() {
    let err = handlers::moon_report(state(), "{not json".to_string())
        .await
        .unwrap_err();
    let (status, json) = response_json(err.into_response()).await;
    assert_eq!(status, 400);
    assert!(json["error"].as_str().unwrap().contains("invalid request body"));
}

#[tokio::test]
async fn bad_timestamp_yields_error_payload() {
    let body = r#"{"timestamp": "yesterday-ish"}"#;
    let err = handlers::mars_report(state(), body.to_string())
        .await
        .unwrap_err();
    let (status, json) = response_json(err.into_response()).await;
    assert_eq!(status, 400);
    assert!(json["error"].as_str().unwrap().contains("timestamp"));
}

#[tokio::test]
async fn located_response_serializes_expected_keys() {
    let body = r#"{"latitude": 35.7478, "longitude": -95.3697, "timestamp": "2025-03-12 00:00:22"}"#;
    let response = handlers::moon_report(state(), body.to_string()).await.unwrap();
    let json = serde_json::to_value(&response.0).unwrap();

    for key in [
        "name",
        "timestamp",
        "position",
        "celestial_coordinates",
        "distance",
        "constellation",
        "constellation_precise",
        "current_phase",
        "moon_age",
        "phases",
        "libration",
        "moonrise_and_set",
        "viewing_conditions",
        "observer",
        "time_scales",
        "precision",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    // Mars fields must not leak into a moon payload
    assert!(json.get("marsrise_and_set").is_none());
    assert!(json.get("magnitude").is_none());

    let rise_set = &json["moonrise_and_set"];
    assert!(rise_set.get("next_moonrise").is_some());
    assert!(rise_set.get("next_moonset").is_some());
    assert!(rise_set.get("next_transit").is_some());
}
