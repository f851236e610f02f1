//! Analyzer configuration

use serde::{Deserialize, Serialize};

/// Frame and feature parameters for the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Analysis frame length in samples
    pub frame_size: usize,

    /// Hop between frames in samples
    pub hop_size: usize,

    /// Lower bound of the pitch search band (Hz)
    pub pitch_min_hz: f64,

    /// Upper bound of the pitch search band (Hz), clamped to Nyquist
    pub pitch_max_hz: f64,

    /// A pitch candidate must reach this fraction of the frame's peak magnitude
    pub pitch_threshold: f64,

    /// Waveforms whose peak amplitude is below this are treated as silent
    pub silence_threshold: f32,

    /// Number of mel bands used for MFCCs and the onset envelope
    pub num_mels: usize,

    /// Number of cepstral coefficients kept
    pub num_mfcc: usize,

    /// Energy fraction for spectral rolloff
    pub rolloff_fraction: f64,

    /// Per-dimension weights for profile scoring
    pub weights: ScoringWeights,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            pitch_min_hz: 60.0,
            pitch_max_hz: 500.0,
            pitch_threshold: 0.1,
            silence_threshold: 1e-4,
            num_mels: 40,
            num_mfcc: 13,
            rolloff_fraction: 0.85,
            weights: ScoringWeights::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set frame and hop sizes (both clamped to at least one sample)
    pub fn with_frames(mut self, frame_size: usize, hop_size: usize) -> Self {
        self.frame_size = frame_size.max(1);
        self.hop_size = hop_size.max(1);
        self
    }

    /// Set the pitch search band
    pub fn with_pitch_range(mut self, min_hz: f64, max_hz: f64) -> Self {
        self.pitch_min_hz = min_hz;
        self.pitch_max_hz = max_hz;
        self
    }

    pub fn with_silence_threshold(mut self, threshold: f32) -> Self {
        self.silence_threshold = threshold;
        self
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }
}

/// Weights combining per-dimension sub-scores into one match score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub formant: f64,
    pub pitch: f64,
    pub rate: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            formant: 0.4,
            pitch: 0.3,
            rate: 0.3,
        }
    }
}

impl ScoringWeights {
    /// Scale the weights to sum to 1
    ///
    /// Negative or non-finite weights count as zero. If nothing is left the
    /// defaults are returned.
    pub fn normalized(&self) -> Self {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let (f, p, r) = (clean(self.formant), clean(self.pitch), clean(self.rate));
        let sum = f + p + r;
        if sum <= 0.0 {
            return Self::default();
        }
        Self {
            formant: f / sum,
            pitch: p / sum,
            rate: r / sum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoringWeights::default().normalized();
        assert!((w.formant + w.pitch + w.rate - 1.0).abs() < 1e-12);
        assert!((w.formant - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_rescales() {
        let w = ScoringWeights {
            formant: 2.0,
            pitch: 1.0,
            rate: 1.0,
        }
        .normalized();
        assert!((w.formant - 0.5).abs() < 1e-12);
        assert!((w.rate - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_degenerate_falls_back() {
        let w = ScoringWeights {
            formant: -1.0,
            pitch: f64::NAN,
            rate: 0.0,
        }
        .normalized();
        assert_eq!(w, ScoringWeights::default());
    }

    #[test]
    fn test_with_frames_clamps() {
        let c = AnalyzerConfig::new().with_frames(0, 0);
        assert_eq!(c.frame_size, 1);
        assert_eq!(c.hop_size, 1);
    }
}
