//! Extractor trait and its configuration

use super::Waveform;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Audio extractor trait - allows swapping between in-process and ffmpeg decoding
pub trait AudioExtractor {
    /// Decode the audio track of a media file into a mono waveform
    fn extract(&self, media_path: &Path) -> Result<Waveform>;

    /// Short name for logs and reports
    fn name(&self) -> &'static str;
}

/// Settings shared by the extractors
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Stop decoding after this many seconds of audio; 0 decodes everything
    pub max_duration_secs: u32,

    /// ffmpeg executable
    pub ffmpeg_path: PathBuf,

    /// Output sample rate requested from ffmpeg
    pub ffmpeg_sample_rate: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 300,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffmpeg_sample_rate: 22050,
        }
    }
}

impl ExtractorConfig {
    pub fn with_max_duration(mut self, secs: u32) -> Self {
        self.max_duration_secs = secs;
        self
    }

    pub fn with_ffmpeg(mut self, path: PathBuf) -> Self {
        self.ffmpeg_path = path;
        self
    }
}
