//! In-process decoding with symphonia

use super::traits::{AudioExtractor, ExtractorConfig};
use super::Waveform;
use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decodes the first audio track of a container and downmixes it to mono
///
/// The native sample rate is kept.
pub struct SymphoniaExtractor {
    config: ExtractorConfig,
}

impl SymphoniaExtractor {
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for SymphoniaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioExtractor for SymphoniaExtractor {
    fn extract(&self, media_path: &Path) -> Result<Waveform> {
        let (samples, sample_rate) = decode_to_mono(media_path, self.config.max_duration_secs)?;

        log::debug!(
            "Decoded {} samples ({:.1}s) at {}Hz",
            samples.len(),
            samples.len() as f32 / sample_rate as f32,
            sample_rate
        );

        if samples.is_empty() {
            anyhow::bail!("No audio samples decoded from {:?}", media_path);
        }

        Waveform::new(samples, i64::from(sample_rate))
            .with_context(|| format!("Decoded audio is unusable: {:?}", media_path))
    }

    fn name(&self) -> &'static str {
        "symphonia"
    }
}

/// Decode audio file to mono f32 samples
pub(crate) fn decode_to_mono(path: &Path, max_duration_secs: u32) -> Result<(Vec<f32>, u32)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open media file: {:?}", path))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(ext.to_str().unwrap_or(""));
    }

    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .with_context(|| format!("Failed to probe media format: {:?}", path))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("No sample rate in audio track")?;

    let dec_opts = DecoderOptions::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .context("Failed to create audio decoder")?;

    let mut all_samples: Vec<f32> = Vec::new();
    let max_samples = sample_rate as usize * max_duration_secs as usize;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Error reading packet: {:?}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Error decoding packet: {:?}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let duration = decoded.capacity() as u64;

        let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();

        // Average channels down to mono
        let channels = spec.channels.count();
        if channels > 1 {
            for chunk in samples.chunks(channels) {
                let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                all_samples.push(mono);
            }
        } else {
            all_samples.extend_from_slice(samples);
        }

        if max_samples > 0 && all_samples.len() >= max_samples {
            log::debug!("Reached {}s decode limit", max_duration_secs);
            all_samples.truncate(max_samples);
            break;
        }
    }

    Ok((all_samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_requires_file() {
        let result = SymphoniaExtractor::new().extract(Path::new("/nonexistent/file.mp4"));
        assert!(result.is_err());
    }
}
