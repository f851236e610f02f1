//! Profile matching and confidence

use super::profile::{Accent, ProfileTable};
use super::scoring::{score_profile, ProfileScore};
use crate::analysis::ScoringWeights;
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};

/// Outcome of classifying one feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub accent: Accent,

    /// Winning share of the summed match scores, in `[0, 100]`
    pub confidence: f64,

    pub explanation: String,

    /// Per-profile breakdown in precedence order
    pub scores: Vec<ProfileScore>,
}

/// Classify features against a profile table
///
/// The winner is the highest total score. On equal totals the accent
/// declared first in [`Accent::ALL`] wins: only a strictly greater score
/// replaces the current leader.
///
/// Confidence is `100 * winner / sum(totals)`, or 0 when every total is 0.
pub fn classify(
    features: &FeatureVector,
    profiles: &ProfileTable,
    weights: &ScoringWeights,
) -> ClassificationResult {
    let weights = weights.normalized();
    let scores: Vec<ProfileScore> = profiles
        .iter()
        .map(|profile| score_profile(features, profile, &weights))
        .collect();

    let mut best = scores[0];
    for score in &scores[1..] {
        if score.total > best.total {
            best = *score;
        }
    }

    let confidence = confidence(&scores, best.total);
    let explanation = explain(features, best.accent, confidence);

    ClassificationResult {
        accent: best.accent,
        confidence,
        explanation,
        scores,
    }
}

/// Winning score as a percentage of all scores
pub fn confidence(scores: &[ProfileScore], winning_total: f64) -> f64 {
    let sum: f64 = scores.iter().map(|s| s.total).sum();
    if !(sum > 0.0) || !winning_total.is_finite() {
        return 0.0;
    }
    (100.0 * winning_total / sum).clamp(0.0, 100.0)
}

fn explain(features: &FeatureVector, accent: Accent, confidence: f64) -> String {
    let [r0, r1, r2] = features.formant_ratios;
    format!(
        "Analysis based on pitch patterns, formant frequencies, and speaking rate. \
         Detected speaking rate: {:.0} words/min, pitch variance: {:.3}, \
         mean pitch: {:.0} Hz, formant ratios: {:.2}/{:.2}/{:.2}. \
         Closest profile: {} ({:.1}% of total match).",
        features.speaking_rate,
        features.pitch_variance,
        features.mean_pitch_hz,
        r0,
        r1,
        r2,
        accent,
        confidence
    )
}
