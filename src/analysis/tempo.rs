//! Multi-window tempo estimation
//!
//! One full-track pass provides the canonical beat sequence. Independent
//! passes over the first few fixed-length windows add estimates that keep
//! an atypical intro or outro from dominating the final median.

use super::beat::BeatTracker;
use super::config::{AnalysisConfig, SegmentConfig};
use super::onset::OnsetExtractor;
use crate::error::AnalysisError;
use crate::model::{BeatSequence, TempoEstimate, TempoSource, Waveform};
use std::ops::Range;

/// Tempo candidates plus the full-track beat sequence
#[derive(Debug, Clone, PartialEq)]
pub struct TempoEstimation {
    pub estimates: Vec<TempoEstimate>,
    pub beats: BeatSequence,
}

pub struct TempoEstimator {
    extractor: OnsetExtractor,
    tracker: BeatTracker,
    segments: SegmentConfig,
}

impl TempoEstimator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            extractor: OnsetExtractor::new(config),
            tracker: BeatTracker::new(config.tracker),
            segments: config.segments,
        }
    }

    /// Run the segment passes and the full-track pass
    pub fn estimate(&self, waveform: &Waveform) -> Result<TempoEstimation, AnalysisError> {
        let samples = waveform.samples();
        let sample_rate = waveform.sample_rate();

        let full_onset = self.extractor.extract(samples)?;
        let full = self.tracker.track(&full_onset);

        let windows = segment_windows(
            samples.len(),
            sample_rate,
            &self.segments,
            self.extractor.min_samples(),
        );

        let mut estimates = Vec::with_capacity(windows.len() + 1);
        for (index, range) in windows {
            let onset = self.extractor.extract(&samples[range])?;
            let bpm = self.tracker.track(&onset).bpm;
            let estimate = TempoEstimate::new(bpm, TempoSource::Segment(index));
            log::debug!("{}: {:.2} BPM", estimate.source, estimate.bpm);
            estimates.push(estimate);
        }

        let estimate = TempoEstimate::new(full.bpm, TempoSource::FullTrack);
        log::debug!(
            "{}: {:.2} BPM, {} beats",
            estimate.source,
            estimate.bpm,
            full.beats.len()
        );
        estimates.push(estimate);

        Ok(TempoEstimation {
            estimates,
            beats: BeatSequence::new(
                full.beats,
                full_onset.hop_length(),
                full_onset.sample_rate(),
            ),
        })
    }
}

/// Sample ranges of the windows that get their own tempo pass
///
/// The signal is cut into `max(1, len / segment_len)` windows; windows not
/// longer than the minimum, or holding fewer than `min_samples` samples, are
/// skipped and do not count toward the cap.
pub fn segment_windows(
    len: usize,
    sample_rate: u32,
    config: &SegmentConfig,
    min_samples: usize,
) -> Vec<(usize, Range<usize>)> {
    let segment_len = (config.segment_seconds * sample_rate as f64) as usize;
    let min_len = config.min_segment_seconds * sample_rate as f64;
    if segment_len == 0 || len == 0 {
        return Vec::new();
    }

    let count = (len / segment_len).max(1);
    (0..count)
        .map(|i| (i, i * segment_len..((i + 1) * segment_len).min(len)))
        .filter(|(_, range)| range.len() >= min_samples && range.len() as f64 > min_len)
        .take(config.max_segments)
        .collect()
}
