//! Audio analysis layer
//!
//! Tempo and cue point analysis behind the `AudioAnalyzer` trait. The
//! stages run leaf-first: onset envelope, beat tracking over the full track
//! and over fixed windows, reconciliation, cue selection.

mod analyzer;
mod beat;
pub mod config;
mod cue;
pub mod decode;
mod onset;
mod reconcile;
mod tempo;
mod traits;

pub use analyzer::TempoAnalyzer;
pub use beat::{BeatTrack, BeatTracker};
pub use config::{AnalysisConfig, Calibration, CueConfig, OctaveRange, SegmentConfig, TrackerConfig};
pub use cue::{CuePoints, CueSelector};
pub use decode::load_waveform;
pub use onset::{OnsetEnvelope, OnsetExtractor};
pub use reconcile::{ReconciledTempo, TempoReconciler};
pub use tempo::{segment_windows, TempoEstimation, TempoEstimator};
pub use traits::AudioAnalyzer;
