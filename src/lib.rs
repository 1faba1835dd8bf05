//! Tempo Cue - BPM estimation and DJ cue point suggestion
//!
//! This library estimates the tempo of audio tracks from several windowed
//! beat-tracking passes and suggests mix-in and mix-out cue points, with a
//! batch driver that analyzes a folder and writes the results as JSON.

pub mod analysis;
pub mod error;
pub mod export;
pub mod model;

pub use analysis::{AnalysisConfig, AudioAnalyzer, TempoAnalyzer};
pub use error::AnalysisError;
pub use export::config::BatchConfig;
pub use export::pipeline::BatchPipeline;
pub use model::{AnalysisResult, Waveform};
