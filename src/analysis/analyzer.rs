//! The accent analyzer: feature extraction followed by classification

use super::config::AnalyzerConfig;
use crate::audio::Waveform;
use crate::classify::{classify, ClassificationResult, ProfileTable};
use crate::error::Result;
use crate::features::{extract_features, FeatureVector};
use std::sync::Arc;

/// Analyzer holding its configuration and a shared, read-only profile table
#[derive(Debug, Clone)]
pub struct AccentAnalyzer {
    config: AnalyzerConfig,
    profiles: Arc<ProfileTable>,
}

impl AccentAnalyzer {
    /// Analyzer with default configuration and the built-in profiles
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            profiles: Arc::new(ProfileTable::builtin()),
        }
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom profile table (loaded once at startup)
    pub fn with_profiles(mut self, profiles: Arc<ProfileTable>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    /// Extract the feature vector only
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureVector> {
        extract_features(waveform, &self.config)
    }

    /// Classify an already extracted feature vector
    pub fn classify(&self, features: &FeatureVector) -> ClassificationResult {
        classify(features, &self.profiles, &self.config.weights)
    }

    /// Extract features and classify them
    pub fn analyze(&self, waveform: &Waveform) -> Result<ClassificationResult> {
        log::debug!(
            "Analyzing {} samples ({:.1}s) at {}Hz",
            waveform.len(),
            waveform.duration_secs(),
            waveform.sample_rate()
        );
        let features = self.extract(waveform)?;
        let result = self.classify(&features);
        log::info!(
            "Classified as {} (confidence {:.1}%)",
            result.accent,
            result.confidence
        );
        Ok(result)
    }
}

impl Default for AccentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze raw samples with the default analyzer
///
/// Input is validated before any feature computation: an empty waveform or a
/// sample rate `<= 0` fails with [`crate::Error::InvalidInput`].
pub fn analyze(samples: &[f32], sample_rate: i64) -> Result<ClassificationResult> {
    let waveform = Waveform::new(samples.to_vec(), sample_rate)?;
    AccentAnalyzer::new().analyze(&waveform)
}
