//! Data model shared by the analysis stages and the batch driver

pub mod result;
mod tempo;
mod waveform;

pub use result::AnalysisResult;
pub use tempo::{BeatSequence, TempoEstimate, TempoSource};
pub use waveform::Waveform;
