//! End-to-end analysis: source -> media file -> waveform -> accent

use crate::analysis::AccentAnalyzer;
use crate::audio::AudioExtractor;
use crate::classify::ClassificationResult;
use crate::error::Error;
use crate::features::FeatureVector;
use crate::fetch::{is_valid_video_url, FetchConfig, MediaFetcher, MediaSource};
use serde::Serialize;

/// Failure of one pipeline run, tagged with the stage that failed
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("download failed: {0:#}")]
    Download(anyhow::Error),

    #[error("audio extraction failed: {0:#}")]
    Extraction(anyhow::Error),

    #[error(transparent)]
    Analysis(#[from] Error),
}

impl PipelineError {
    /// Stage name reported to API clients
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::InvalidSource(_) => "source",
            PipelineError::Download(_) => "download",
            PipelineError::Extraction(_) => "extract",
            PipelineError::Analysis(_) => "classify",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::InvalidSource(_) => "INVALID_SOURCE",
            PipelineError::Download(_) => "DOWNLOAD_FAILED",
            PipelineError::Extraction(_) => "EXTRACTION_FAILED",
            PipelineError::Analysis(e) => e.code(),
        }
    }

    /// Failure outside this process (remote server, media decoder)
    pub fn is_upstream(&self) -> bool {
        matches!(self, PipelineError::Download(_) | PipelineError::Extraction(_))
    }
}

/// Result of one successful run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub source: String,
    pub extractor: &'static str,
    pub sample_rate: u32,
    pub duration_secs: f64,

    #[serde(flatten)]
    pub result: ClassificationResult,

    pub features: FeatureVector,
}

/// Fetches, extracts and classifies one media source per call
///
/// Holds no per-request state; one instance is shared across requests.
pub struct AnalysisPipeline<E: AudioExtractor> {
    fetcher: MediaFetcher,
    extractor: E,
    analyzer: AccentAnalyzer,
}

impl<E: AudioExtractor> AnalysisPipeline<E> {
    pub fn new(fetch_config: FetchConfig, extractor: E, analyzer: AccentAnalyzer) -> Self {
        Self {
            fetcher: MediaFetcher::new(fetch_config),
            extractor,
            analyzer,
        }
    }

    pub fn analyzer(&self) -> &AccentAnalyzer {
        &self.analyzer
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Analyze a user-supplied video URL, rejecting anything that does not
    /// look like a video link before any network traffic
    pub fn run_video_url(&self, url: &str) -> Result<AnalysisReport, PipelineError> {
        let url = url.trim();
        if !is_valid_video_url(url) {
            return Err(PipelineError::InvalidSource(format!(
                "Invalid video URL: {}. Provide a direct video link or a supported host",
                url
            )));
        }
        let source =
            MediaSource::parse(url).map_err(|e| PipelineError::InvalidSource(format!("{:#}", e)))?;
        self.run(&source)
    }

    /// Analyze a URL or local file
    pub fn run(&self, source: &MediaSource) -> Result<AnalysisReport, PipelineError> {
        log::info!("Analyzing {}", source);

        // Keeps the temp file alive until extraction finishes
        let download;
        let media_path = match source {
            MediaSource::Remote(url) => {
                download = self.fetcher.fetch(url).map_err(PipelineError::Download)?;
                download.path().to_path_buf()
            }
            MediaSource::Local(path) => {
                if !path.is_file() {
                    return Err(PipelineError::InvalidSource(format!(
                        "File not found: {}",
                        path.display()
                    )));
                }
                path.clone()
            }
        };

        let waveform = self
            .extractor
            .extract(&media_path)
            .map_err(PipelineError::Extraction)?;
        log::debug!(
            "Extracted {:.1}s of audio at {}Hz with {}",
            waveform.duration_secs(),
            waveform.sample_rate(),
            self.extractor.name()
        );

        let features = self.analyzer.extract(&waveform)?;
        let result = self.analyzer.classify(&features);
        log::info!("{}: {} ({:.1}%)", source, result.accent, result.confidence);

        Ok(AnalysisReport {
            source: source.to_string(),
            extractor: self.extractor.name(),
            sample_rate: waveform.sample_rate(),
            duration_secs: waveform.duration_secs(),
            result,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Waveform;
    use anyhow::Result;
    use std::path::{Path, PathBuf};

    /// Extractor that ignores the file and returns a fixed waveform
    struct FixedExtractor(Vec<f32>);

    impl AudioExtractor for FixedExtractor {
        fn extract(&self, _media_path: &Path) -> Result<Waveform> {
            Ok(Waveform::new(self.0.clone(), 16000)?)
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct FailingExtractor;

    impl AudioExtractor for FailingExtractor {
        fn extract(&self, media_path: &Path) -> Result<Waveform> {
            anyhow::bail!("cannot decode {:?}", media_path)
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn pipeline<E: AudioExtractor>(extractor: E) -> AnalysisPipeline<E> {
        AnalysisPipeline::new(FetchConfig::default(), extractor, AccentAnalyzer::new())
    }

    #[test]
    fn test_invalid_url_rejected_before_fetch() {
        let err = pipeline(FailingExtractor)
            .run_video_url("https://example.com/index.html")
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSource(_)));
        assert_eq!(err.stage(), "source");
        assert!(!err.is_upstream());
    }

    #[test]
    fn test_missing_local_file() {
        let source = MediaSource::Local(PathBuf::from("/nonexistent/clip.wav"));
        let err = pipeline(FailingExtractor).run(&source).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSource(_)));
    }

    #[test]
    fn test_extraction_failure_is_upstream() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = MediaSource::Local(file.path().to_path_buf());
        let err = pipeline(FailingExtractor).run(&source).unwrap_err();
        assert_eq!(err.stage(), "extract");
        assert_eq!(err.code(), "EXTRACTION_FAILED");
        assert!(err.is_upstream());
    }

    #[test]
    fn test_silence_reports_classify_stage() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = MediaSource::Local(file.path().to_path_buf());
        let err = pipeline(FixedExtractor(vec![0.0; 32000]))
            .run(&source)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Analysis(Error::Analysis(_))));
        assert_eq!(err.stage(), "classify");
        assert_eq!(err.code(), "ANALYSIS_FAILED");
    }

    #[test]
    fn test_report_for_tone() {
        let samples: Vec<f32> = (0..32000)
            .map(|i| (2.0 * std::f32::consts::PI * 200.0 * i as f32 / 16000.0).sin() * 0.4)
            .collect();
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = MediaSource::Local(file.path().to_path_buf());

        let report = pipeline(FixedExtractor(samples)).run(&source).unwrap();
        assert_eq!(report.extractor, "fixed");
        assert_eq!(report.sample_rate, 16000);
        assert!((report.duration_secs - 2.0).abs() < 1e-9);
        assert!((0.0..=100.0).contains(&report.result.confidence));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("accent").is_some());
        assert!(json.get("confidence").is_some());
        assert!(json.get("features").is_some());
    }
}
