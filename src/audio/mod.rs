//! Audio preprocessing: media file to mono waveform
//!
//! Decoding is behind the [`AudioExtractor`] trait so the pipeline can use
//! symphonia in-process or shell out to ffmpeg.

mod decode;
mod ffmpeg;
mod traits;
mod waveform;

pub use decode::SymphoniaExtractor;
pub use ffmpeg::{ffmpeg_version, FfmpegExtractor};
pub use traits::{AudioExtractor, ExtractorConfig};
pub use waveform::Waveform;

use anyhow::Result;
use std::path::Path;

/// Extractor chosen at startup
pub enum AnyExtractor {
    Symphonia(SymphoniaExtractor),
    Ffmpeg(FfmpegExtractor),
}

impl AudioExtractor for AnyExtractor {
    fn extract(&self, media_path: &Path) -> Result<Waveform> {
        match self {
            AnyExtractor::Symphonia(e) => e.extract(media_path),
            AnyExtractor::Ffmpeg(e) => e.extract(media_path),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AnyExtractor::Symphonia(e) => e.name(),
            AnyExtractor::Ffmpeg(e) => e.name(),
        }
    }
}
