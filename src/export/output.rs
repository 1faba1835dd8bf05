//! JSON persistence and batch statistics

use crate::model::AnalysisResult;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write results as a pretty-printed JSON array
pub fn write_results(path: &Path, results: &[AnalysisResult]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create results file: {:?}", path))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, results)
        .with_context(|| format!("Failed to serialize results to {:?}", path))?;
    writer.write_all(b"\n")?;
    writer
        .flush()
        .with_context(|| format!("Failed to write results file: {:?}", path))?;

    log::info!("Wrote {} result(s) to {:?}", results.len(), path);
    Ok(())
}

/// Aggregate BPM statistics over the successful tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub tracks: usize,
    pub min_bpm: u32,
    pub max_bpm: u32,
    /// Mean of the integer BPMs, rounded
    pub average_bpm: u32,
}

impl Summary {
    /// None when nothing was analyzed
    pub fn from_results(results: &[AnalysisResult]) -> Option<Self> {
        let min_bpm = results.iter().map(|r| r.bpm).min()?;
        let max_bpm = results.iter().map(|r| r.bpm).max()?;
        let total: u64 = results.iter().map(|r| u64::from(r.bpm)).sum();
        let average = total as f64 / results.len() as f64;

        Some(Self {
            tracks: results.len(),
            min_bpm,
            max_bpm,
            average_bpm: average.round() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(file: &str, bpm: u32) -> AnalysisResult {
        AnalysisResult {
            file: file.to_string(),
            bpm,
            bpm_precise: bpm as f64,
            bpm_raw: bpm as f64,
            duration: "03:00".to_string(),
            duration_seconds: 180.0,
            cue_in: "00:15".to_string(),
            cue_in_seconds: 15.0,
            cue_out: "02:45".to_string(),
            cue_out_seconds: 165.0,
            total_beats: 360,
        }
    }

    #[test]
    fn test_summary() {
        let results = vec![result("a.mp3", 124), result("b.mp3", 128), result("c.mp3", 131)];
        let summary = Summary::from_results(&results).unwrap();

        assert_eq!(summary.tracks, 3);
        assert_eq!(summary.min_bpm, 124);
        assert_eq!(summary.max_bpm, 131);
        // 383 / 3 = 127.67
        assert_eq!(summary.average_bpm, 128);
    }

    #[test]
    fn test_summary_empty() {
        assert!(Summary::from_results(&[]).is_none());
    }

    #[test]
    fn test_write_results() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("analysis_results.json");
        let results = vec![result("a.mp3", 124), result("b.mp3", 128)];

        write_results(&path, &results).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<AnalysisResult> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, results);
        assert!(text.contains("\n  {"));
    }
}
