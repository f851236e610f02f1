//! Acoustic feature extraction
//!
//! Every feature is a pure function of the waveform. Degenerate input gets a
//! documented fallback per feature (unvoiced pitch, fallback formant ratios,
//! zero onsets) rather than an error; only a silent or non-finite result is
//! rejected.

mod formant;
mod mfcc;
mod onset;
mod pitch;
mod spectral;
mod spectrum;

pub use formant::FALLBACK_RATIOS;
pub use mfcc::MfccSummary;
pub use onset::PeakPicking;
pub use pitch::PitchStats;
pub use spectral::SpectralSummary;
pub use spectrum::Spectrogram;

use crate::analysis::AnalyzerConfig;
use crate::audio::Waveform;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Scalar measurements derived from one waveform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Length of the analysed audio (seconds)
    pub duration_secs: f64,

    pub mean_pitch_hz: f64,

    /// Pitch variance over squared mean pitch
    pub pitch_variance: f64,

    /// Fraction of frames with a detected pitch
    pub voiced_ratio: f64,

    /// `[f1/f0, f2/f0, f2/f1]` of the three lowest dominant peaks
    pub formant_ratios: [f64; 3],

    /// Onsets per minute
    pub speaking_rate: f64,

    pub onset_count: usize,

    pub spectral: SpectralSummary,

    pub mfcc: MfccSummary,
}

impl FeatureVector {
    /// True when every scalar is finite
    pub fn is_finite(&self) -> bool {
        let scalars = [
            self.duration_secs,
            self.mean_pitch_hz,
            self.pitch_variance,
            self.voiced_ratio,
            self.speaking_rate,
            self.spectral.centroid_hz,
            self.spectral.rolloff_hz,
            self.spectral.flatness,
        ];
        scalars.iter().all(|v| v.is_finite())
            && self.formant_ratios.iter().all(|v| v.is_finite())
            && self.mfcc.means.iter().all(|v| v.is_finite())
            && self.mfcc.variances.iter().all(|v| v.is_finite())
    }
}

/// Extract the full feature vector from a waveform
pub fn extract_features(waveform: &Waveform, config: &AnalyzerConfig) -> Result<FeatureVector> {
    let peak = waveform.peak();
    if peak < config.silence_threshold {
        return Err(Error::analysis(format!(
            "no usable signal: peak amplitude {:.2e} is below the silence threshold {:.2e}",
            peak, config.silence_threshold
        )));
    }

    let spec = Spectrogram::compute(
        waveform.samples(),
        waveform.sample_rate(),
        config.frame_size,
        config.hop_size,
    );
    log::debug!(
        "Spectrogram: {} frames x {} bins (fft={})",
        spec.num_frames(),
        spec.num_bins(),
        spec.fft_size
    );

    let contour = pitch::track_pitch(
        &spec,
        config.pitch_min_hz,
        config.pitch_max_hz,
        config.pitch_threshold,
    );
    let pitch = pitch::pitch_stats(&contour);
    if pitch.voiced_ratio == 0.0 {
        log::debug!("No voiced frames detected; using unvoiced pitch sentinel");
    }

    let formant_ratios = formant::formant_ratios(&spec);

    let mel_db = mfcc::mel_spectrogram_db(&spec, config.num_mels);
    let envelope = onset::onset_envelope(&mel_db);
    let onsets = onset::pick_peaks(&envelope, &PeakPicking::default());
    let duration_secs = waveform.duration_secs();
    let speaking_rate = onset::speaking_rate(onsets.len(), duration_secs);

    let spectral = spectral::spectral_summary(&spec, config.rolloff_fraction);

    let coefficients = mfcc::mfcc(&mel_db, config.num_mfcc);
    let mfcc = mfcc::summarize(&coefficients, config.num_mfcc);

    let features = FeatureVector {
        duration_secs,
        mean_pitch_hz: pitch.mean_hz,
        pitch_variance: pitch.variance,
        voiced_ratio: pitch.voiced_ratio,
        formant_ratios,
        speaking_rate,
        onset_count: onsets.len(),
        spectral,
        mfcc,
    };

    if !features.is_finite() {
        return Err(Error::analysis("feature extraction produced non-finite values"));
    }

    log::debug!(
        "Features: pitch={:.1}Hz var={:.4} rate={:.0}/min formants={:?}",
        features.mean_pitch_hz,
        features.pitch_variance,
        features.speaking_rate,
        features.formant_ratios
    );

    Ok(features)
}
