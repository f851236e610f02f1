//! Fundamental-frequency tracking
//!
//! Per frame, the strongest bin inside the pitch band is taken as the pitch
//! candidate when it stands out against the rest of the frame, then refined
//! with parabolic interpolation.

use super::spectrum::Spectrogram;
use serde::{Deserialize, Serialize};

/// Absolute magnitude floor for a voiced frame
const MIN_VOICED_MAGNITUDE: f64 = 1e-6;

/// Pitch statistics over the voiced frames of a waveform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchStats {
    /// Mean pitch over voiced frames (Hz), 0 when none were voiced
    pub mean_hz: f64,

    /// Pitch variance divided by the squared mean (dimensionless)
    pub variance: f64,

    /// Fraction of frames that produced a pitch
    pub voiced_ratio: f64,
}

impl PitchStats {
    /// Sentinel used when no voiced frame was found
    pub fn unvoiced() -> Self {
        Self {
            mean_hz: 0.0,
            variance: 0.0,
            voiced_ratio: 0.0,
        }
    }
}

/// Per-frame pitch contour; `None` for unvoiced frames
pub fn track_pitch(
    spec: &Spectrogram,
    min_hz: f64,
    max_hz: f64,
    threshold: f64,
) -> Vec<Option<f64>> {
    let nyquist = spec.sample_rate as f64 / 2.0;
    let max_hz = max_hz.min(nyquist);
    let bin_hz = spec.sample_rate as f64 / spec.fft_size as f64;

    // Interpolation needs a neighbour on each side
    let lo = ((min_hz / bin_hz).ceil() as usize).max(1);
    let hi = ((max_hz / bin_hz).floor() as usize).min(spec.num_bins().saturating_sub(2));

    spec.frames
        .iter()
        .map(|frame| {
            if lo > hi {
                return None;
            }
            let frame_max = frame.iter().cloned().fold(0.0f64, f64::max);
            let (best, mag) = (lo..=hi).fold((lo, frame[lo]), |acc, k| {
                if frame[k] > acc.1 {
                    (k, frame[k])
                } else {
                    acc
                }
            });

            if mag <= MIN_VOICED_MAGNITUDE || mag < threshold * frame_max {
                return None;
            }

            let shift = parabolic_shift(frame[best - 1], frame[best], frame[best + 1]);
            let hz = (best as f64 + shift) * bin_hz;
            (hz > 0.0).then_some(hz)
        })
        .collect()
}

/// Summarise a pitch contour
pub fn pitch_stats(contour: &[Option<f64>]) -> PitchStats {
    let voiced: Vec<f64> = contour.iter().flatten().copied().collect();
    if voiced.is_empty() {
        return PitchStats::unvoiced();
    }

    let n = voiced.len() as f64;
    let mean = voiced.iter().sum::<f64>() / n;
    let var = voiced.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / n;

    PitchStats {
        mean_hz: mean,
        variance: var / (mean * mean),
        voiced_ratio: n / contour.len() as f64,
    }
}

/// Offset of the true peak from the centre bin, in bins (within ±0.5)
#[inline]
fn parabolic_shift(a: f64, b: f64, c: f64) -> f64 {
    let denom = a - 2.0 * b + c;
    if denom.abs() < f64::EPSILON {
        0.0
    } else {
        (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sr: u32, secs: f64) -> Vec<f32> {
        let n = (sr as f64 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sr as f64).sin() as f32 * 0.5)
            .collect()
    }

    #[test]
    fn test_sine_pitch_is_stable() {
        let samples = sine(220.0, 16000, 1.0);
        let spec = Spectrogram::compute(&samples, 16000, 2048, 512);
        let contour = track_pitch(&spec, 60.0, 500.0, 0.1);
        let stats = pitch_stats(&contour);

        assert!((stats.mean_hz - 220.0).abs() < 5.0, "mean {}", stats.mean_hz);
        assert!(stats.variance < 0.01, "variance {}", stats.variance);
        assert!(stats.voiced_ratio > 0.9);
    }

    #[test]
    fn test_silence_is_unvoiced() {
        let spec = Spectrogram::compute(&vec![0.0f32; 8000], 16000, 2048, 512);
        let contour = track_pitch(&spec, 60.0, 500.0, 0.1);
        assert!(contour.iter().all(Option::is_none));
        assert_eq!(pitch_stats(&contour), PitchStats::unvoiced());
    }

    #[test]
    fn test_band_above_nyquist_is_unvoiced() {
        let samples = sine(50.0, 200, 2.0);
        let spec = Spectrogram::compute(&samples, 200, 64, 16);
        let contour = track_pitch(&spec, 150.0, 500.0, 0.1);
        assert!(contour.iter().all(Option::is_none));
    }

    #[test]
    fn test_stats_variance_is_normalized() {
        let contour = vec![Some(100.0), Some(300.0), None, None];
        let stats = pitch_stats(&contour);
        assert_eq!(stats.mean_hz, 200.0);
        // var = 10000, mean^2 = 40000
        assert!((stats.variance - 0.25).abs() < 1e-12);
        assert_eq!(stats.voiced_ratio, 0.5);
    }
}
