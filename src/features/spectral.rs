//! Spectral shape descriptors averaged over frames

use super::spectrum::Spectrogram;
use serde::{Deserialize, Serialize};

/// Frames with less total power than this are skipped
const MIN_FRAME_POWER: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralSummary {
    /// Mean spectral centroid (Hz)
    pub centroid_hz: f64,

    /// Mean rolloff frequency (Hz)
    pub rolloff_hz: f64,

    /// Mean spectral flatness, 0 (tonal) to 1 (noise-like)
    pub flatness: f64,
}

pub fn spectral_summary(spec: &Spectrogram, rolloff_fraction: f64) -> SpectralSummary {
    let mut centroid_sum = 0.0;
    let mut rolloff_sum = 0.0;
    let mut flatness_sum = 0.0;
    let mut counted = 0usize;

    for frame in &spec.frames {
        let total: f64 = frame.iter().sum();
        let power: f64 = frame.iter().map(|m| m * m).sum();
        if power < MIN_FRAME_POWER || total <= 0.0 {
            continue;
        }

        let weighted: f64 = frame
            .iter()
            .enumerate()
            .map(|(k, &m)| spec.bin_frequency(k) * m)
            .sum();
        centroid_sum += weighted / total;

        let target = rolloff_fraction.clamp(0.0, 1.0) * power;
        let mut acc = 0.0;
        let mut rolloff_bin = frame.len() - 1;
        for (k, &m) in frame.iter().enumerate() {
            acc += m * m;
            if acc >= target {
                rolloff_bin = k;
                break;
            }
        }
        rolloff_sum += spec.bin_frequency(rolloff_bin);

        flatness_sum += flatness(frame);
        counted += 1;
    }

    if counted == 0 {
        return SpectralSummary {
            centroid_hz: 0.0,
            rolloff_hz: 0.0,
            flatness: 0.0,
        };
    }

    let n = counted as f64;
    SpectralSummary {
        centroid_hz: centroid_sum / n,
        rolloff_hz: rolloff_sum / n,
        flatness: flatness_sum / n,
    }
}

/// Geometric over arithmetic mean of the power spectrum
fn flatness(frame: &[f64]) -> f64 {
    let floor = 1e-10;
    let n = frame.len() as f64;
    let powers = frame.iter().map(|m| (m * m).max(floor));
    let (log_sum, sum) = powers.fold((0.0, 0.0), |(l, s), p| (l + p.ln(), s + p));
    let arith = sum / n;
    ((log_sum / n).exp() / arith).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sine_centroid_near_tone() {
        let sr = 16000u32;
        let samples: Vec<f32> = (0..sr)
            .map(|i| (2.0 * PI * 2000.0 * i as f64 / sr as f64).sin() as f32)
            .collect();
        let spec = Spectrogram::compute(&samples, sr, 1024, 256);
        let s = spectral_summary(&spec, 0.85);
        assert!((s.centroid_hz - 2000.0).abs() < 300.0, "{:?}", s);
        assert!((s.rolloff_hz - 2000.0).abs() < 300.0, "{:?}", s);
        assert!(s.flatness < 0.2);
    }

    #[test]
    fn test_silence_is_zero() {
        let spec = Spectrogram::compute(&vec![0.0f32; 2048], 16000, 1024, 256);
        let s = spectral_summary(&spec, 0.85);
        assert_eq!(s.centroid_hz, 0.0);
        assert_eq!(s.rolloff_hz, 0.0);
        assert_eq!(s.flatness, 0.0);
    }
}
