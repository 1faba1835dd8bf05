use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tempo_cue::analysis::{Calibration, SegmentConfig};
use tempo_cue::{AnalysisConfig, BatchConfig, BatchPipeline, TempoAnalyzer};

#[derive(Parser, Debug)]
#[command(name = "tempo-cue")]
#[command(about = "Estimate BPM and suggest DJ cue points for a folder of tracks", long_about = None)]
struct Args {
    /// Folder containing the audio files
    folder: String,

    /// Results file name, written inside the folder
    #[arg(short = 'o', long, default_value = "analysis_results.json")]
    output: String,

    /// Number of files analyzed in parallel
    #[arg(short = 'j', long, default_value = "1")]
    jobs: usize,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable the +2 BPM calibration between 115 and 135 BPM
    #[arg(long)]
    no_calibration: bool,

    /// Offset applied inside the calibration band
    #[arg(long, default_value = "2.0")]
    calibration_offset: f64,

    /// Length of each tempo window in seconds
    #[arg(long, default_value = "30")]
    segment_seconds: f64,

    /// Maximum number of tempo windows per track
    #[arg(long, default_value = "4")]
    max_segments: usize,

    /// Windows not longer than this (seconds) are skipped
    #[arg(long, default_value = "5")]
    min_segment_seconds: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    log::info!("Tempo Cue - BPM and cue point analysis");
    log::info!("======================================");

    // Expand ~ in paths
    let folder = PathBuf::from(shellexpand::tilde(&args.folder).as_ref());

    let calibration = if args.no_calibration {
        log::info!("Calibration disabled");
        None
    } else {
        Some(Calibration {
            offset: args.calibration_offset,
            ..Calibration::default()
        })
    };

    let analysis_config = AnalysisConfig::new()
        .with_segments(SegmentConfig {
            segment_seconds: args.segment_seconds,
            max_segments: args.max_segments,
            min_segment_seconds: args.min_segment_seconds,
        })
        .with_calibration(calibration);

    let config = BatchConfig::new(folder)
        .with_output_name(args.output)
        .with_jobs(args.jobs);

    let pipeline = BatchPipeline::new(config, TempoAnalyzer::new(analysis_config))?;
    let report = pipeline.run()?;

    for (path, reason) in &report.failed {
        log::warn!("Failed: {:?} ({})", path, reason);
    }

    match (&report.summary, &report.output_path) {
        (Some(summary), Some(path)) => {
            log::info!("Analyzed {} track(s)", summary.tracks);
            log::info!("BPM range: {}-{}", summary.min_bpm, summary.max_bpm);
            log::info!("Average BPM: {}", summary.average_bpm);
            log::info!("Results saved to: {:?}", path);
        }
        _ => log::warn!("No tracks were analyzed"),
    }

    Ok(())
}
