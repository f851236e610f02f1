//! Mel spectrogram and MFCC summaries

use super::spectrum::Spectrogram;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Floor applied to mel power before taking the log
const POWER_FLOOR: f64 = 1e-10;

/// Dynamic range kept below the loudest mel cell
const TOP_DB: f64 = 80.0;

/// Mean and variance of each cepstral coefficient over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfccSummary {
    pub means: Vec<f64>,
    pub variances: Vec<f64>,
}

/// Log-power mel spectrogram in dB, `[num_frames][num_mels]`
///
/// Values are clipped to [`TOP_DB`] below the global maximum so near-silent
/// bands cannot dominate frame-to-frame differences.
pub fn mel_spectrogram_db(spec: &Spectrogram, num_mels: usize) -> Vec<Vec<f64>> {
    let num_mels = num_mels.max(1);
    let filterbank = mel_filterbank(
        num_mels,
        spec.fft_size,
        spec.sample_rate,
        0.0,
        spec.sample_rate as f64 / 2.0,
    );

    let mut mel_db: Vec<Vec<f64>> = (0..spec.num_frames())
        .map(|f| {
            let power = spec.power(f);
            filterbank
                .iter()
                .map(|filter| {
                    let energy: f64 = filter.iter().zip(power.iter()).map(|(w, p)| w * p).sum();
                    10.0 * energy.max(POWER_FLOOR).log10()
                })
                .collect()
        })
        .collect();

    clip_top_db(&mut mel_db, TOP_DB);
    mel_db
}

/// Raise every value to at least `max - top_db`
fn clip_top_db(mel_db: &mut [Vec<f64>], top_db: f64) {
    let max = mel_db
        .iter()
        .flatten()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return;
    }
    let floor = max - top_db;
    for v in mel_db.iter_mut().flatten() {
        *v = v.max(floor);
    }
}

/// MFCCs via orthonormal DCT-II of the dB mel spectrogram
pub fn mfcc(mel_db: &[Vec<f64>], num_coefficients: usize) -> Vec<Vec<f64>> {
    mel_db
        .iter()
        .map(|frame| dct_ortho(frame, num_coefficients))
        .collect()
}

/// Summarise MFCC frames
pub fn summarize(coefficients: &[Vec<f64>], num_coefficients: usize) -> MfccSummary {
    let mut means = vec![0.0f64; num_coefficients];
    let mut variances = vec![0.0f64; num_coefficients];
    if coefficients.is_empty() {
        return MfccSummary { means, variances };
    }

    let n = coefficients.len() as f64;
    for c in 0..num_coefficients {
        let mean = coefficients.iter().map(|f| f[c]).sum::<f64>() / n;
        let var = coefficients
            .iter()
            .map(|f| (f[c] - mean) * (f[c] - mean))
            .sum::<f64>()
            / n;
        means[c] = mean;
        variances[c] = var;
    }

    MfccSummary { means, variances }
}

fn dct_ortho(input: &[f64], num_coefficients: usize) -> Vec<f64> {
    let n = input.len();
    if n == 0 {
        return vec![0.0; num_coefficients];
    }
    let nf = n as f64;
    (0..num_coefficients)
        .map(|k| {
            let sum: f64 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * nf)).cos())
                .sum();
            let scale = if k == 0 {
                (1.0 / nf).sqrt()
            } else {
                (2.0 / nf).sqrt()
            };
            sum * scale
        })
        .collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank weights, `[num_mels][fft_size / 2 + 1]`
fn mel_filterbank(
    num_mels: usize,
    fft_size: usize,
    sample_rate: u32,
    low_freq: f64,
    high_freq: f64,
) -> Vec<Vec<f64>> {
    let half_fft = fft_size / 2 + 1;
    let mel_low = hz_to_mel(low_freq);
    let mel_high = hz_to_mel(high_freq);

    let bin_indices: Vec<usize> = (0..num_mels + 2)
        .map(|i| {
            let mel = mel_low + i as f64 * (mel_high - mel_low) / (num_mels + 1) as f64;
            let bin = (mel_to_hz(mel) * fft_size as f64 / sample_rate as f64).floor() as isize;
            bin.clamp(0, half_fft as isize - 1) as usize
        })
        .collect();

    (0..num_mels)
        .map(|m| {
            let mut filter = vec![0.0f64; half_fft];
            let (left, center, right) = (bin_indices[m], bin_indices[m + 1], bin_indices[m + 2]);
            if center > left {
                for k in left..=center {
                    filter[k] = (k - left) as f64 / (center - left) as f64;
                }
            }
            if right > center {
                for k in center..=right {
                    filter[k] = (right - k) as f64 / (right - center) as f64;
                }
            }
            filter
        })
        .collect()
}
