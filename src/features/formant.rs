//! Coarse formant-ratio estimate from dominant spectral peaks

use super::spectrum::Spectrogram;

/// Ratios used when fewer than three peaks are found
pub const FALLBACK_RATIOS: [f64; 3] = [1.2, 2.0, 1.6];

/// Number of strongest peaks considered
const TOP_PEAKS: usize = 10;

/// Peaks below this frequency are ignored (Hz)
const MIN_PEAK_HZ: f64 = 50.0;

/// Minimum distance between two retained peaks (Hz)
const MIN_PEAK_SPACING_HZ: f64 = 50.0;

/// Peaks weaker than this fraction of the strongest one are window leakage
const MIN_RELATIVE_MAGNITUDE: f64 = 0.1;

/// Formant ratios `[f1/f0, f2/f0, f2/f1]` of the three lowest dominant peaks
///
/// The peaks come from the time-averaged magnitude spectrum.
pub fn formant_ratios(spec: &Spectrogram) -> [f64; 3] {
    let freqs = dominant_peaks(spec);
    if freqs.len() < 3 {
        return FALLBACK_RATIOS;
    }
    let (f0, f1, f2) = (freqs[0], freqs[1], freqs[2]);
    [f1 / f0, f2 / f0, f2 / f1]
}

/// Frequencies of the strongest local maxima, ascending
fn dominant_peaks(spec: &Spectrogram) -> Vec<f64> {
    let mean = spec.mean_magnitudes();
    if mean.len() < 3 {
        return Vec::new();
    }

    let mut candidates: Vec<(f64, f64)> = (1..mean.len() - 1)
        .filter(|&k| mean[k] > mean[k - 1] && mean[k] >= mean[k + 1] && mean[k] > 0.0)
        .map(|k| (spec.bin_frequency(k), mean[k]))
        .filter(|&(hz, _)| hz >= MIN_PEAK_HZ)
        .collect();

    // Strongest first; ties by frequency so the order is total
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.total_cmp(&b.0)));

    let floor = candidates.first().map_or(0.0, |c| c.1 * MIN_RELATIVE_MAGNITUDE);
    candidates.retain(|c| c.1 >= floor);

    let mut kept: Vec<f64> = Vec::with_capacity(TOP_PEAKS);
    for (hz, _) in candidates {
        if kept.iter().all(|&k| (k - hz).abs() >= MIN_PEAK_SPACING_HZ) {
            kept.push(hz);
            if kept.len() == TOP_PEAKS {
                break;
            }
        }
    }

    kept.sort_by(|a, b| a.total_cmp(b));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_harmonic_series_ratios() {
        let sr = 16000u32;
        let samples: Vec<f32> = (0..sr)
            .map(|i| {
                let t = i as f64 / sr as f64;
                ((2.0 * PI * 500.0 * t).sin()
                    + 0.8 * (2.0 * PI * 1000.0 * t).sin()
                    + 0.6 * (2.0 * PI * 1500.0 * t).sin()) as f32
                    * 0.3
            })
            .collect();
        let spec = Spectrogram::compute(&samples, sr, 2048, 512);
        let ratios = formant_ratios(&spec);
        assert!((ratios[0] - 2.0).abs() < 0.05, "{:?}", ratios);
        assert!((ratios[1] - 3.0).abs() < 0.05, "{:?}", ratios);
        assert!((ratios[2] - 1.5).abs() < 0.05, "{:?}", ratios);
    }

    #[test]
    fn test_silence_falls_back() {
        let spec = Spectrogram::compute(&vec![0.0f32; 4096], 16000, 1024, 256);
        assert_eq!(formant_ratios(&spec), FALLBACK_RATIOS);
    }
}
