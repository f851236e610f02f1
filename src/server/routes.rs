//! HTTP request handlers

use super::error::{ApiError, ApiResult};
use super::page;
use super::AppState;
use crate::audio::{ffmpeg_version, Waveform};
use crate::classify::ClassificationResult;
use crate::pipeline::AnalysisReport;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Html,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WaveformRequest {
    samples: Vec<f32>,
    sample_rate: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    module: &'static str,
    version: &'static str,
    extractor: &'static str,
    uptime_seconds: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = chrono::Utc::now() - state.startup_time;
    Json(HealthResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        extractor: state.pipeline.extractor_name(),
        uptime_seconds: uptime.num_seconds(),
    })
}

/// POST /api/analyze
pub async fn analyze_url(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisReport>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let video_url = required_url(request.video_url)?;

    let pipeline = state.pipeline.clone();
    let report = run_blocking(&state, move || pipeline.run_video_url(&video_url)).await??;
    Ok(Json(report))
}

/// POST /api/analyze/waveform
pub async fn analyze_waveform(
    State(state): State<AppState>,
    body: Result<Json<WaveformRequest>, JsonRejection>,
) -> ApiResult<Json<ClassificationResult>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let waveform = Waveform::new(request.samples, request.sample_rate)?;

    let pipeline = state.pipeline.clone();
    let result = run_blocking(&state, move || pipeline.analyzer().analyze(&waveform)).await??;
    Ok(Json(result))
}

/// GET /test-ffmpeg
pub async fn test_ffmpeg(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let path = state.ffmpeg_path.clone();
    let checked = tokio::task::spawn_blocking(move || ffmpeg_version(&path)).await;

    match checked {
        Ok(Ok(version)) => (
            StatusCode::OK,
            Json(json!({ "available": true, "version": version })),
        ),
        Ok(Err(e)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "available": false, "error": format!("{:#}", e) })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "available": false, "error": e.to_string() })),
        ),
    }
}

/// GET /
pub async fn form_page() -> Html<String> {
    Html(page::render_form())
}

#[derive(Debug, Deserialize)]
pub struct FormInput {
    video_url: Option<String>,
}

/// POST / - same pipeline as the API, rendered as HTML
pub async fn form_submit(
    State(state): State<AppState>,
    Form(input): Form<FormInput>,
) -> (StatusCode, Html<String>) {
    let raw = input.video_url.unwrap_or_default();
    let outcome = match required_url(Some(raw.clone())) {
        Ok(video_url) => {
            let pipeline = state.pipeline.clone();
            run_blocking(&state, move || pipeline.run_video_url(&video_url))
                .await
                .and_then(|r| r.map_err(ApiError::from))
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => (StatusCode::OK, Html(page::render_report(&raw, &report))),
        Err(e) => (e.status(), Html(page::render_error(&raw, &e.to_string()))),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn required_url(video_url: Option<String>) -> ApiResult<String> {
    match video_url.map(|u| u.trim().to_string()) {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(ApiError::BadRequest("video_url is required".to_string())),
    }
}

/// Run CPU/IO-bound work off the async runtime
///
/// Waiting for an analysis slot counts against the request timeout. The slot
/// is held by the blocking task, so a timed-out analysis keeps it until it
/// actually finishes.
async fn run_blocking<T, F>(state: &AppState, work: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let limit = state.request_timeout;
    let slots = state.analysis_slots.clone();
    let task = async move {
        let permit = slots
            .acquire_owned()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            work()
        })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
    };

    match tokio::time::timeout(limit, task).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("Analysis exceeded {}s timeout", limit.as_secs());
            Err(ApiError::Timeout(limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_url() {
        assert_eq!(
            required_url(Some("  https://x.com/a.mp4 ".into())).unwrap(),
            "https://x.com/a.mp4"
        );
        assert!(matches!(required_url(None), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            required_url(Some("   ".into())),
            Err(ApiError::BadRequest(_))
        ));
    }
}
