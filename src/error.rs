//! Per-track analysis errors
//!
//! Every variant is recoverable at batch level: the failing track is logged,
//! skipped and left out of the summary statistics.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Waveform is empty or too short for the analysis window
    #[error("insufficient audio: {0}")]
    InsufficientAudio(String),

    /// The tempo estimator produced no estimates
    #[error("no tempo data")]
    NoTempoData,

    /// Non-positive or non-finite tempo reached octave correction
    #[error("invalid tempo value: {0}")]
    InvalidTempoValue(f64),

    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

impl AnalysisError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AnalysisError::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
