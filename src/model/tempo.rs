use std::fmt;

/// Where a tempo estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoSource {
    /// Window `i` of the segment partition (0-based)
    Segment(usize),
    FullTrack,
}

impl fmt::Display for TempoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TempoSource::Segment(i) => write!(f, "segment {}", i),
            TempoSource::FullTrack => write!(f, "full-track"),
        }
    }
}

/// A single tempo candidate in beats per minute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    pub bpm: f64,
    pub source: TempoSource,
}

impl TempoEstimate {
    pub fn new(bpm: f64, source: TempoSource) -> Self {
        Self { bpm, source }
    }
}

/// Beat positions from one beat-tracking pass
///
/// Positions are onset-envelope frame indices in increasing order.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatSequence {
    frames: Vec<usize>,
    hop_length: usize,
    sample_rate: u32,
}

impl BeatSequence {
    pub fn new(frames: Vec<usize>, hop_length: usize, sample_rate: u32) -> Self {
        debug_assert!(frames.windows(2).all(|w| w[0] < w[1]));
        Self {
            frames,
            hop_length,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Time in seconds of a frame index
    pub fn frame_to_seconds(&self, frame: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        frame as f64 * self.hop_length as f64 / self.sample_rate as f64
    }

    /// Beat times in seconds
    pub fn times(&self) -> Vec<f64> {
        self.frames
            .iter()
            .map(|&f| self.frame_to_seconds(f))
            .collect()
    }
}
