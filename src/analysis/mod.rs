//! Accent analysis entry points
//!
//! [`AccentAnalyzer`] wires feature extraction to classification. The core is
//! synchronous and holds no mutable state; the profile table is shared
//! read-only behind an `Arc`.

mod analyzer;
mod config;

pub use analyzer::{analyze, AccentAnalyzer};
pub use config::{AnalyzerConfig, ScoringWeights};
