//! Analyzer trait definition

use crate::error::AnalysisError;
use crate::model::{AnalysisResult, Waveform};

/// Audio analyzer trait - lets the batch driver run any implementation
pub trait AudioAnalyzer: Send + Sync {
    /// Analyze one decoded track
    ///
    /// `file` identifies the track in the result (usually its file name).
    fn analyze(&self, file: &str, waveform: &Waveform) -> Result<AnalysisResult, AnalysisError>;

    /// Sample rate the analyzer expects its waveforms in
    fn sample_rate(&self) -> u32;
}
