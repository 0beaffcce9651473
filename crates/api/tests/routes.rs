//! HTTP route tests against an in-process router

use std::sync::Arc;
use std::time::Duration;

use api::{create_router, AppState, SharedState};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use detection_scheduler::DetectionLoop;
use dms::DmsConfig;
use landmark_capture::{LandmarkSource, ScriptedSource, SyntheticFace};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

fn app_with(source: Box<dyn LandmarkSource>) -> (Router, SharedState) {
    let detection = DetectionLoop::new(DmsConfig::default(), source).unwrap();
    let state = Arc::new(RwLock::new(AppState::new(detection, None)));
    (create_router(Arc::clone(&state)), state)
}

fn closed_eyes() -> Box<dyn LandmarkSource> {
    Box::new(ScriptedSource::repeat(Some(SyntheticFace::eyes_closed().build()), 60))
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test(start_paused = true)]
async fn test_health() {
    let (app, _) = app_with(closed_eyes());
    let (status, body) = send(&app, "GET", "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["detection_running"], false);
}

#[tokio::test(start_paused = true)]
async fn test_start_detect_and_stop() {
    let (app, state) = app_with(closed_eyes());

    let (status, body) = send(&app, "POST", "/api/v1/detection/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], true);
    assert_eq!(body["poll_interval_ms"], 100);

    tokio::time::sleep(Duration::from_millis(3550)).await;

    let (_, counters) = send(&app, "GET", "/api/v1/counters").await;
    assert_eq!(counters["microsleeps"], 1);
    assert!(counters["blinks"].as_u64().unwrap() > 0);

    let (status, body) = send(&app, "POST", "/api/v1/detection/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], false);
    assert!(!state.read().await.detection.is_running());

    // idle stop is still a success
    let (status, _) = send(&app, "POST", "/api/v1/detection/stop").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test(start_paused = true)]
async fn test_start_without_model_is_unavailable() {
    let source = ScriptedSource::new(Vec::new()).failing_load();
    let (app, _) = app_with(Box::new(source));

    let (status, body) = send(&app, "POST", "/api/v1/detection/start").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "model_unavailable");

    let (_, status_body) = send(&app, "GET", "/api/v1/detection/status").await;
    assert_eq!(status_body["running"], false);
}

#[tokio::test(start_paused = true)]
async fn test_event_paging() {
    let (app, _) = app_with(closed_eyes());
    send(&app, "POST", "/api/v1/detection/start").await;
    tokio::time::sleep(Duration::from_millis(1050)).await;
    send(&app, "POST", "/api/v1/detection/stop").await;

    let (_, all) = send(&app, "GET", "/api/v1/events").await;
    let total = all["count"].as_u64().unwrap();
    assert!(total >= 4);
    assert_eq!(all["data"][0]["kind"], "info");

    let (_, page) = send(&app, "GET", "/api/v1/events?limit=2").await;
    assert_eq!(page["count"], 2);
    let cursor = page["next_after"].as_u64().unwrap();

    let (_, rest) = send(&app, "GET", &format!("/api/v1/events?after={}", cursor)).await;
    assert_eq!(rest["count"].as_u64().unwrap(), total - 2);
}

#[tokio::test(start_paused = true)]
async fn test_reset_counters() {
    let (app, _) = app_with(closed_eyes());
    send(&app, "POST", "/api/v1/detection/start").await;
    tokio::time::sleep(Duration::from_millis(550)).await;

    let (status, counters) = send(&app, "POST", "/api/v1/counters/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counters["blinks"], 0);
    assert_eq!(counters["microsleeps"], 0);

    let (_, events) = send(&app, "GET", "/api/v1/events?limit=1000").await;
    let descriptions: Vec<&str> = events["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["description"].as_str())
        .collect();
    assert!(descriptions.contains(&"Counters reset"));
    send(&app, "POST", "/api/v1/detection/stop").await;
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let (app, _) = app_with(closed_eyes());
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_cursor_rejected() {
    let (app, _) = app_with(closed_eyes());
    let (status, body) = send(&app, "GET", "/api/v1/events?after=latest").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}
