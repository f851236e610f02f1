//! Extraction through an external ffmpeg process

use super::decode::decode_to_mono;
use super::traits::{AudioExtractor, ExtractorConfig};
use super::Waveform;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Runs ffmpeg to produce a mono 16-bit WAV, then decodes it
///
/// Handles containers and codecs symphonia cannot read (e.g. webm/opus).
/// Resampling to `ffmpeg_sample_rate` happens here, in ffmpeg.
pub struct FfmpegExtractor {
    config: ExtractorConfig,
}

impl FfmpegExtractor {
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

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioExtractor for FfmpegExtractor {
    fn extract(&self, media_path: &Path) -> Result<Waveform> {
        let work_dir = tempfile::tempdir().context("Failed to create temp directory")?;
        let wav_path = work_dir.path().join("audio.wav");

        log::debug!("Running ffmpeg on {:?}", media_path);
        let output = Command::new(&self.config.ffmpeg_path)
            .args(ffmpeg_args(media_path, &wav_path, &self.config))
            .output()
            .with_context(|| format!("Failed to run {:?}", self.config.ffmpeg_path))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(3).collect();
            anyhow::bail!(
                "ffmpeg exited with {}: {}",
                output.status,
                tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
            );
        }

        let (samples, sample_rate) = decode_to_mono(&wav_path, self.config.max_duration_secs)?;
        if samples.is_empty() {
            anyhow::bail!("ffmpeg produced no audio for {:?}", media_path);
        }

        Waveform::new(samples, i64::from(sample_rate))
            .with_context(|| format!("Extracted audio is unusable: {:?}", media_path))
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// Arguments for a mono 16-bit WAV conversion; a zero duration cap means no `-t`
fn ffmpeg_args(input: &Path, output: &Path, config: &ExtractorConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), input.into()];
    for arg in ["-vn", "-acodec", "pcm_s16le", "-ar"] {
        args.push(arg.into());
    }
    args.push(config.ffmpeg_sample_rate.to_string().into());
    args.push("-ac".into());
    args.push("1".into());
    if config.max_duration_secs > 0 {
        args.push("-t".into());
        args.push(config.max_duration_secs.to_string().into());
    }
    args.push("-y".into());
    args.push(output.into());
    args
}

/// First line of `ffmpeg -version`, or an error if ffmpeg cannot be run
pub fn ffmpeg_version(ffmpeg_path: &Path) -> Result<String> {
    let output = Command::new(ffmpeg_path)
        .arg("-version")
        .output()
        .with_context(|| format!("ffmpeg not found at {:?}", ffmpeg_path))?;

    if !output.status.success() {
        anyhow::bail!(
            "ffmpeg -version failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().next().unwrap_or_default().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_binary_is_an_error() {
        let bogus = PathBuf::from("/nonexistent/ffmpeg-binary");
        assert!(ffmpeg_version(&bogus).is_err());

        let extractor =
            FfmpegExtractor::new().with_config(ExtractorConfig::default().with_ffmpeg(bogus));
        assert!(extractor.extract(Path::new("/tmp/whatever.mp4")).is_err());
    }

    #[test]
    fn test_duration_cap_arguments() {
        let input = Path::new("in.mp4");
        let output = Path::new("out.wav");

        let config = ExtractorConfig::default().with_max_duration(30);
        let capped = ffmpeg_args(input, output, &config);
        let t = capped.iter().position(|a| a == "-t").unwrap();
        assert_eq!(capped[t + 1], "30");
        assert_eq!(capped.last().unwrap(), "out.wav");

        let config = ExtractorConfig::default().with_max_duration(0);
        let uncapped = ffmpeg_args(input, output, &config);
        assert!(!uncapped.iter().any(|a| a == "-t"));
        assert!(uncapped.iter().any(|a| a == "22050"));
    }
}
