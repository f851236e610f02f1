use accent_analyzer::audio::{
    ffmpeg_version, AnyExtractor, AudioExtractor, ExtractorConfig, FfmpegExtractor,
    SymphoniaExtractor,
};
use accent_analyzer::fetch::{FetchConfig, MediaSource};
use accent_analyzer::server::{self, AppState, ServerConfig};
use accent_analyzer::{AccentAnalyzer, AnalysisPipeline, AnalysisReport, ProfileTable};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use walkdir::WalkDir;

/// File extensions picked up when a directory is given as a source
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "m4a", "mov", "mkv", "webm", "avi", "wav", "mp3", "flac", "ogg", "aac",
];

#[derive(Parser, Debug)]
#[command(name = "accent-analyzer")]
#[command(about = "Classify the English accent spoken in a video or audio file", long_about = None)]
struct Args {
    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// JSON profile table replacing the built-in accent profiles
    #[arg(long, global = true, env = "ACCENT_PROFILES")]
    profiles: Option<String>,

    /// Audio extraction backend
    #[arg(long, global = true, value_enum, default_value_t = ExtractorKind::Symphonia)]
    extractor: ExtractorKind,

    /// ffmpeg executable (used by the ffmpeg extractor and check-ffmpeg)
    #[arg(long, global = true, env = "ACCENT_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: String,

    /// Analyze at most this many seconds of audio per source (0 = no limit)
    #[arg(long, global = true, default_value = "300")]
    max_duration: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze URLs, files or directories
    Analyze {
        /// URLs, file:// URIs, files or directories
        #[arg(required = true)]
        sources: Vec<String>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,

        /// Parallel analyses (0 = one per CPU)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,
    },

    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "ACCENT_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,

        /// Per-request analysis timeout (seconds)
        #[arg(long, env = "ACCENT_REQUEST_TIMEOUT", default_value = "300")]
        timeout: u64,

        /// Analyses run at once (default: one per CPU)
        #[arg(long, env = "ACCENT_MAX_CONCURRENT")]
        max_concurrent: Option<usize>,
    },

    /// Check that ffmpeg can be run
    CheckFfmpeg,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ExtractorKind {
    Symphonia,
    Ffmpeg,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let ffmpeg_path = PathBuf::from(shellexpand::tilde(&args.ffmpeg).as_ref());

    match &args.command {
        Command::CheckFfmpeg => check_ffmpeg(&ffmpeg_path),
        Command::Analyze {
            sources,
            json,
            jobs,
        } => {
            let pipeline = build_pipeline(&args, &ffmpeg_path)?;
            run_analyze(&pipeline, sources, *json, *jobs)
        }
        Command::Serve {
            bind,
            timeout,
            max_concurrent,
        } => {
            let pipeline = Arc::new(build_pipeline(&args, &ffmpeg_path)?);
            let mut config = ServerConfig::new(*bind).with_timeout(Duration::from_secs(*timeout));
            if let Some(n) = max_concurrent {
                config = config.with_max_concurrent(*n);
            }
            let state = AppState::new(pipeline, ffmpeg_path.clone(), &config);

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(server::serve(&config, state))
        }
    }
}

fn build_pipeline(args: &Args, ffmpeg_path: &Path) -> Result<AnalysisPipeline<AnyExtractor>> {
    let extractor_config = ExtractorConfig::default()
        .with_max_duration(args.max_duration)
        .with_ffmpeg(ffmpeg_path.to_path_buf());

    let extractor = match args.extractor {
        ExtractorKind::Symphonia => {
            AnyExtractor::Symphonia(SymphoniaExtractor::new().with_config(extractor_config))
        }
        ExtractorKind::Ffmpeg => {
            AnyExtractor::Ffmpeg(FfmpegExtractor::new().with_config(extractor_config))
        }
    };

    let mut analyzer = AccentAnalyzer::new();
    if let Some(ref profiles) = args.profiles {
        let path = PathBuf::from(shellexpand::tilde(profiles).as_ref());
        log::info!("Loading accent profiles from {:?}", path);
        analyzer = analyzer.with_profiles(Arc::new(ProfileTable::from_json_file(&path)?));
    }

    log::info!("Audio extractor: {}", extractor.name());
    Ok(AnalysisPipeline::new(FetchConfig::default(), extractor, analyzer))
}

fn check_ffmpeg(ffmpeg_path: &Path) -> Result<()> {
    let version = ffmpeg_version(ffmpeg_path)?;
    println!("✅ ffmpeg is working: {}", version);
    Ok(())
}

fn run_analyze(
    pipeline: &AnalysisPipeline<AnyExtractor>,
    inputs: &[String],
    json: bool,
    jobs: usize,
) -> Result<()> {
    let mut sources = Vec::new();
    for input in inputs {
        sources.extend(expand_source(input)?);
    }
    if sources.is_empty() {
        anyhow::bail!("No media files found in {:?}", inputs);
    }
    log::info!("Analyzing {} source(s)", sources.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to build worker pool")?;

    let results: Vec<_> = pool.install(|| {
        sources
            .par_iter()
            .map(|source| (source, pipeline.run(source)))
            .collect()
    });

    let mut reports = Vec::new();
    let mut failures = 0;
    for (source, result) in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                failures += 1;
                log::error!("{}: {} (stage: {})", source, e, e.stage());
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} source(s) failed", failures, sources.len());
    }
    Ok(())
}

/// A source argument, with directories expanded to the media files inside
fn expand_source(input: &str) -> Result<Vec<MediaSource>> {
    let source = MediaSource::parse(input)?;
    let dir = match &source {
        MediaSource::Local(path) if path.is_dir() => path.clone(),
        _ => return Ok(vec![source]),
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(&dir).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read directory {:?}", dir))?;
        if entry.file_type().is_file() && is_media_file(entry.path()) {
            files.push(MediaSource::Local(entry.into_path()));
        }
    }
    log::debug!("Found {} media file(s) in {:?}", files.len(), dir);
    Ok(files)
}

fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MEDIA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn print_report(report: &AnalysisReport) {
    let result = &report.result;
    println!("{}", report.source);
    println!("  Accent:     {}", result.accent);
    println!("  Confidence: {:.1}%", result.confidence);
    println!(
        "  Audio:      {:.1}s at {}Hz ({})",
        report.duration_secs, report.sample_rate, report.extractor
    );
    println!("  {}", result.explanation);
    println!();
}
