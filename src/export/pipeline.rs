//! Batch analysis pipeline orchestration

use super::config::BatchConfig;
use super::output::{write_results, Summary};
use super::scan::find_audio_files;
use crate::analysis::{load_waveform, AudioAnalyzer};
use crate::error::AnalysisError;
use crate::model::AnalysisResult;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Analysis outcome for a single file
type FileOutcome = Result<AnalysisResult, AnalysisError>;

/// Outcome of one batch run
#[derive(Debug)]
pub struct BatchReport {
    /// Successful results in discovery order
    pub results: Vec<AnalysisResult>,

    /// Files that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,

    /// Results file, when anything was written
    pub output_path: Option<PathBuf>,

    pub summary: Option<Summary>,
}

/// Folder analysis pipeline
pub struct BatchPipeline<A: AudioAnalyzer> {
    config: BatchConfig,
    analyzer: A,
}

impl<A: AudioAnalyzer> BatchPipeline<A> {
    /// Create a new pipeline, checking that the folder exists
    pub fn new(config: BatchConfig, analyzer: A) -> Result<Self> {
        if !config.folder.is_dir() {
            anyhow::bail!("Folder not found: {:?}", config.folder);
        }

        Ok(Self { config, analyzer })
    }

    /// Analyze every audio file in the folder and persist the results
    pub fn run(&self) -> Result<BatchReport> {
        let files = find_audio_files(&self.config.folder)?;
        if files.is_empty() {
            anyhow::bail!("No audio files found in {:?}", self.config.folder);
        }

        log::info!(
            "Analyzing {} file(s) in {:?} ({} job(s))",
            files.len(),
            self.config.folder,
            self.config.jobs
        );

        let outcomes = self.analyze_files(&files)?;

        let mut results = Vec::with_capacity(files.len());
        let mut failed = Vec::new();
        for (path, outcome) in files.into_iter().zip(outcomes) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    log::warn!("Skipping {:?}: {}", path, e);
                    failed.push((path, e.to_string()));
                }
            }
        }

        let summary = Summary::from_results(&results);
        let output_path = if results.is_empty() {
            log::warn!("No file could be analyzed, nothing written");
            None
        } else {
            let path = self.config.output_path();
            write_results(&path, &results)?;
            Some(path)
        };

        log::info!(
            "Batch complete: {} analyzed, {} failed",
            results.len(),
            failed.len()
        );

        Ok(BatchReport {
            results,
            failed,
            output_path,
            summary,
        })
    }

    /// Per-file outcomes in the same order as `files`
    fn analyze_files(&self, files: &[PathBuf]) -> Result<Vec<FileOutcome>> {
        let total = files.len();

        if self.config.jobs <= 1 {
            return Ok(files
                .iter()
                .enumerate()
                .map(|(i, path)| self.analyze_file(i, total, path))
                .collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
            .context("Failed to build worker pool")?;

        Ok(pool.install(|| {
            files
                .par_iter()
                .enumerate()
                .map(|(i, path)| self.analyze_file(i, total, path))
                .collect()
        }))
    }

    fn analyze_file(&self, index: usize, total: usize, path: &Path) -> FileOutcome {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::info!("[{}/{}] Processing: {}", index + 1, total, name);

        let waveform = load_waveform(path, self.analyzer.sample_rate())?;
        self.analyzer.analyze(&name, &waveform)
    }
}
