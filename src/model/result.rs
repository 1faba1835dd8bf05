//! Terminal analysis record
//!
//! This is the only type that leaves the analysis core. Field names match the
//! JSON written by the batch driver.

use crate::analysis::{CuePoints, ReconciledTempo};
use serde::{Deserialize, Serialize};

/// Complete analysis result for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// File name of the analyzed track
    pub file: String,

    /// Calibrated BPM rounded to the nearest integer
    pub bpm: u32,

    /// Calibrated BPM rounded to 1 decimal
    pub bpm_precise: f64,

    /// Median estimate before octave correction and calibration (1 decimal)
    pub bpm_raw: f64,

    /// Duration as MM:SS
    pub duration: String,
    pub duration_seconds: f64,

    /// Suggested mix-in point as MM:SS
    pub cue_in: String,
    pub cue_in_seconds: f64,

    /// Suggested mix-out point as MM:SS
    pub cue_out: String,
    pub cue_out_seconds: f64,

    /// Number of beats in the full-track beat sequence
    pub total_beats: usize,
}

impl AnalysisResult {
    /// Combine the outputs of every stage into one record
    pub fn assemble(
        file: impl Into<String>,
        duration: f64,
        tempo: &ReconciledTempo,
        cues: &CuePoints,
        total_beats: usize,
    ) -> Self {
        Self {
            file: file.into(),
            bpm: tempo.bpm,
            bpm_precise: tempo.bpm_precise,
            bpm_raw: tempo.raw_bpm,
            duration: format_time(duration),
            duration_seconds: round_to(duration, 2),
            cue_in: format_time(cues.cue_in),
            cue_in_seconds: round_to(cues.cue_in, 2),
            cue_out: format_time(cues.cue_out),
            cue_out_seconds: round_to(cues.cue_out, 2),
            total_beats,
        }
    }
}

/// Format seconds as zero-padded `MM:SS`, truncating to whole seconds
pub fn format_time(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
