use accent_analyzer::audio::{AnyExtractor, SymphoniaExtractor};
use accent_analyzer::fetch::FetchConfig;
use accent_analyzer::server::{build_router, AppState, ServerConfig};
use accent_analyzer::{AccentAnalyzer, AnalysisPipeline};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_state(config: &ServerConfig) -> AppState {
    let pipeline = AnalysisPipeline::new(
        FetchConfig::default(),
        AnyExtractor::Symphonia(SymphoniaExtractor::new()),
        AccentAnalyzer::new(),
    );
    AppState::new(
        Arc::new(pipeline),
        PathBuf::from("/nonexistent/ffmpeg"),
        config,
    )
}

fn test_app() -> Router {
    let config = ServerConfig::default().with_timeout(Duration::from_secs(30));
    build_router(test_state(&config))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn sine(freq: f64, sample_rate: usize, seconds: usize) -> Vec<f32> {
    (0..sample_rate * seconds)
        .map(|i| {
            (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin() as f32 * 0.5
        })
        .collect()
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "accent-analyzer");
    assert_eq!(body["extractor"], "symphonia");
    assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_root_serves_form() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.contains("text/html"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("name=\"video_url\""));
}

#[tokio::test]
async fn test_form_rejects_invalid_url() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("video_url=https%3A%2F%2Fexample.com%2Fpage.html"))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Invalid video URL"));
}

#[tokio::test]
async fn test_analyze_requires_video_url() {
    let (status, body) = post_json(test_app(), "/api/analyze", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_analyze_rejects_non_video_url() {
    let (status, body) = post_json(
        test_app(),
        "/api/analyze",
        json!({ "video_url": "https://example.com/index.html" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_SOURCE");
    assert_eq!(body["error"]["stage"], "source");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(test_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_waveform_sine() {
    let (status, body) = post_json(
        test_app(),
        "/api/analyze/waveform",
        json!({ "samples": sine(220.0, 16000, 3), "sample_rate": 16000 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let accent = body["accent"].as_str().unwrap();
    assert!(["american", "british", "australian", "indian", "canadian"].contains(&accent));
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&confidence));
    assert!(body["explanation"].as_str().unwrap().contains("words/min"));
    assert_eq!(body["scores"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_waveform_invalid_sample_rate() {
    let (status, body) = post_json(
        test_app(),
        "/api/analyze/waveform",
        json!({ "samples": [0.1, 0.2, 0.3], "sample_rate": -8000 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_waveform_empty() {
    let (status, body) = post_json(
        test_app(),
        "/api/analyze/waveform",
        json!({ "samples": [], "sample_rate": 16000 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_waveform_silence_is_unprocessable() {
    let (status, body) = post_json(
        test_app(),
        "/api/analyze/waveform",
        json!({ "samples": vec![0.0f32; 16000], "sample_rate": 16000 }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "ANALYSIS_FAILED");
    assert_eq!(body["error"]["stage"], "classify");
}

#[tokio::test]
async fn test_ffmpeg_check_reports_missing_binary() {
    let request = Request::builder()
        .uri("/test-ffmpeg")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(test_app(), request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["available"], false);
}

#[tokio::test]
async fn test_waveform_waits_for_a_free_analysis_slot() {
    let config = ServerConfig::default()
        .with_timeout(Duration::from_millis(200))
        .with_max_concurrent(1);
    let state = test_state(&config);
    let busy = state.analysis_slots.clone().try_acquire_owned().unwrap();

    let (status, body) = post_json(
        build_router(state.clone()),
        "/api/analyze/waveform",
        json!({ "samples": sine(220.0, 16000, 1), "sample_rate": 16000 }),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "TIMEOUT");

    assert_eq!(state.analysis_slots.available_permits(), 0);
    drop(busy);
    assert_eq!(state.analysis_slots.available_permits(), 1);
}
