//! Decoded mono audio handed to the analyzer

use crate::error::{Error, Result};

/// Mono `f32` samples at a fixed sample rate
///
/// Construction validates the input, so every `Waveform` the analyzer sees
/// is non-empty, finite and has a positive rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Validate raw samples and a sample rate
    ///
    /// The rate is taken as a signed integer because callers at the JSON
    /// boundary can send anything; `<= 0` is rejected here.
    pub fn new(samples: Vec<f32>, sample_rate: i64) -> Result<Self> {
        if sample_rate <= 0 {
            return Err(Error::invalid(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        let sample_rate = u32::try_from(sample_rate)
            .map_err(|_| Error::invalid(format!("sample rate {} is out of range", sample_rate)))?;

        if samples.is_empty() {
            return Err(Error::invalid("waveform is empty"));
        }

        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(Error::invalid(format!(
                "waveform contains a non-finite sample at index {}",
                pos
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed waveform
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }

    /// Root-mean-square level
    pub fn rms(&self) -> f32 {
        let sum_sq: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum_sq / self.samples.len() as f64).sqrt() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(matches!(
            Waveform::new(vec![0.1], 0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Waveform::new(vec![0.1], -16000),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_rate_beyond_u32() {
        assert!(matches!(
            Waveform::new(vec![0.1], i64::from(u32::MAX) + 1),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            Waveform::new(Vec::new(), 16000),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_nan() {
        let err = Waveform::new(vec![0.0, f32::NAN, 0.2], 16000).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidInput("waveform contains a non-finite sample at index 1".to_string())
        );
    }

    #[test]
    fn test_levels() {
        let w = Waveform::new(vec![0.5, -0.5, 0.5, -0.5], 4).unwrap();
        assert_eq!(w.duration_secs(), 1.0);
        assert!((w.peak() - 0.5).abs() < 1e-6);
        assert!((w.rms() - 0.5).abs() < 1e-6);
    }
}
