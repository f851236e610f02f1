//! Accent Analyzer - spoken-English accent classification
//!
//! Decodes the audio of a video or audio file, computes pitch, formant,
//! speaking-rate, spectral and MFCC summaries, and scores them against five
//! reference accent profiles.

pub mod analysis;
pub mod audio;
pub mod classify;
pub mod error;
pub mod features;
pub mod fetch;
pub mod pipeline;
pub mod server;

pub use analysis::{analyze, AccentAnalyzer, AnalyzerConfig, ScoringWeights};
pub use audio::Waveform;
pub use classify::{Accent, ClassificationResult, ProfileTable};
pub use error::{Error, Result};
pub use features::FeatureVector;
pub use pipeline::{AnalysisPipeline, AnalysisReport, PipelineError};
