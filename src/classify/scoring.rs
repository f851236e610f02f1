//! Per-dimension similarity scores
//!
//! Each score lies in `[0, 1]`: 1 for an exact match, falling linearly to 0
//! at the dimension's tolerance.

use super::profile::AccentProfile;
use crate::analysis::ScoringWeights;
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};

/// Summed absolute formant-ratio difference at which the score reaches 0
pub const FORMANT_TOLERANCE: f64 = 3.0;

/// Pitch-variance difference at which the score reaches 0
pub const PITCH_TOLERANCE: f64 = 0.5;

/// Speaking-rate difference (per minute) at which the score reaches 0
pub const RATE_TOLERANCE: f64 = 100.0;

#[inline]
fn linear_score(diff: f64, tolerance: f64) -> f64 {
    (1.0 - diff / tolerance).max(0.0)
}

pub fn formant_score(observed: &[f64; 3], reference: &[f64; 3]) -> f64 {
    let diff: f64 = observed
        .iter()
        .zip(reference.iter())
        .map(|(a, b)| (a - b).abs())
        .sum();
    linear_score(diff, FORMANT_TOLERANCE)
}

pub fn pitch_score(observed: f64, reference: f64) -> f64 {
    linear_score((observed - reference).abs(), PITCH_TOLERANCE)
}

pub fn rate_score(observed: f64, reference: f64) -> f64 {
    linear_score((observed - reference).abs(), RATE_TOLERANCE)
}

/// Score breakdown of one profile against a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileScore {
    pub accent: super::Accent,
    pub formant: f64,
    pub pitch: f64,
    pub rate: f64,
    /// Weighted sum of the sub-scores, in `[0, 1]`
    pub total: f64,
}

/// Score a profile; `weights` must already be normalized
pub fn score_profile(
    features: &FeatureVector,
    profile: &AccentProfile,
    weights: &ScoringWeights,
) -> ProfileScore {
    let formant = formant_score(&features.formant_ratios, &profile.formant_ratios);
    let pitch = pitch_score(features.pitch_variance, profile.pitch_variance);
    let rate = rate_score(features.speaking_rate, profile.speaking_rate);
    let total = weights.formant * formant + weights.pitch * pitch + weights.rate * rate;

    ProfileScore {
        accent: profile.accent,
        formant,
        pitch,
        rate,
        total,
    }
}
