//! HTTP service: browser form plus JSON API
//!
//! Every analysis runs on the blocking pool under `request_timeout`; the
//! pipeline itself is shared read-only across requests.

mod error;
mod page;
mod routes;

pub use error::{ApiError, ApiResult};

use crate::audio::AnyExtractor;
use crate::pipeline::AnalysisPipeline;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Largest accepted request body; raw waveforms are large JSON arrays
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub request_timeout: Duration,

    /// Analyses allowed to run at once; further requests wait for a slot
    pub max_concurrent: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            request_timeout: Duration::from_secs(300),
            max_concurrent: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl ServerConfig {
    pub fn new(bind: SocketAddr) -> Self {
        Self {
            bind,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Zero is treated as one
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline<AnyExtractor>>,
    pub ffmpeg_path: PathBuf,
    pub startup_time: DateTime<Utc>,
    pub request_timeout: Duration,

    /// Bounds concurrent analyses; each holds spectrograms of the whole input
    pub analysis_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<AnalysisPipeline<AnyExtractor>>,
        ffmpeg_path: PathBuf,
        config: &ServerConfig,
    ) -> Self {
        Self {
            pipeline,
            ffmpeg_path,
            startup_time: Utc::now(),
            request_timeout: config.request_timeout,
            analysis_slots: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        }
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::form_page).post(routes::form_submit))
        .route("/health", get(routes::health))
        .route("/test-ffmpeg", get(routes::test_ffmpeg))
        .route("/api/analyze", post(routes::analyze_url))
        .route("/api/analyze/waveform", post(routes::analyze_waveform))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    log::info!("Listening on http://{}", config.bind);
    log::info!(
        "Request timeout: {}s, at most {} concurrent analyses",
        config.request_timeout.as_secs(),
        config.max_concurrent
    );

    axum::serve(listener, app).await.context("HTTP server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_concurrent_at_least_one() {
        let config = ServerConfig::default().with_max_concurrent(0);
        assert_eq!(config.max_concurrent, 1);
        assert!(ServerConfig::default().max_concurrent >= 1);
    }
}
