//! Errors surfaced by the analysis core

use thiserror::Error;

/// Result alias for core analysis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by waveform validation, feature extraction and classification
///
/// I/O glue (download, decode) reports through `anyhow` and is wrapped by
/// [`crate::pipeline::PipelineError`]; this type only covers the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Caller error: empty or malformed waveform, non-positive sample rate
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The waveform carried no usable signal
    #[error("analysis failed: {0}")]
    Analysis(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub(crate) fn analysis(msg: impl Into<String>) -> Self {
        Error::Analysis(msg.into())
    }

    /// Short machine-readable kind, used in API responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Analysis(_) => "ANALYSIS_FAILED",
        }
    }
}
