//! HTTP error responses

use crate::error::Error;
use crate::pipeline::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or incomplete request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A pipeline stage failed; status depends on the stage
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Analysis did not finish in time (504)
    #[error("Analysis timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Worker panicked or was cancelled (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::InvalidSource(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Download(_))
            | ApiError::Pipeline(PipelineError::Extraction(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(PipelineError::Analysis(Error::InvalidInput(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Pipeline(PipelineError::Analysis(Error::Analysis(_))) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Pipeline(e) => e.code(),
            ApiError::Timeout(_) => "TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn stage(&self) -> Option<&'static str> {
        match self {
            ApiError::Pipeline(e) => Some(e.stage()),
            _ => None,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Pipeline(PipelineError::Analysis(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("Request failed: {}", self);
        } else {
            log::debug!("Request rejected: {}", self);
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "stage": self.stage(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
