//! Analysis configuration
//!
//! All tunables are read-only data shared by every track in a batch.

/// Windowed tempo sampling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentConfig {
    /// Window length in seconds
    pub segment_seconds: f64,
    /// Maximum number of windows analyzed
    pub max_segments: usize,
    /// Windows not longer than this are skipped
    pub min_segment_seconds: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            segment_seconds: 30.0,
            max_segments: 4,
            min_segment_seconds: 5.0,
        }
    }
}

/// Fixed offset added to tempos inside an open band
///
/// Fitted for house/techno material, where the beat tracker reads about
/// 2 BPM low between 115 and 135.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Exclusive lower bound
    pub lower: f64,
    /// Exclusive upper bound
    pub upper: f64,
    pub offset: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            lower: 115.0,
            upper: 135.0,
            offset: 2.0,
        }
    }
}

impl Calibration {
    /// Offset for a corrected tempo, 0.0 outside the band
    pub fn offset_for(&self, bpm: f64) -> f64 {
        if bpm > self.lower && bpm < self.upper {
            self.offset
        } else {
            0.0
        }
    }
}

/// Range that octave correction folds tempos into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctaveRange {
    /// Tempos below this are doubled
    pub min_bpm: f64,
    /// Tempos above this are halved
    pub max_bpm: f64,
}

impl Default for OctaveRange {
    fn default() -> Self {
        Self {
            min_bpm: 100.0,
            max_bpm: 160.0,
        }
    }
}

/// Cue point heuristics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueConfig {
    /// Intro/outro length in beats (8 bars of 4/4)
    pub intro_beats: usize,
    /// Cue-in as a fraction of the duration when beats are too sparse
    pub fallback_in: f64,
    /// Cue-out as a fraction of the duration when beats are too sparse
    pub fallback_out: f64,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            intro_beats: 32,
            fallback_in: 0.1,
            fallback_out: 0.9,
        }
    }
}

/// Beat tracker parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    /// Center of the log-normal tempo prior
    pub start_bpm: f64,
    /// Width of the tempo prior in octaves
    pub std_bpm: f64,
    /// Fastest tempo considered
    pub max_tempo: f64,
    /// Tempogram autocorrelation window in seconds
    pub ac_size_seconds: f64,
    /// How strictly beats follow the estimated period
    pub tightness: f64,
    /// Drop weak beats at the start and end
    pub trim: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            start_bpm: 120.0,
            std_bpm: 1.0,
            max_tempo: 320.0,
            ac_size_seconds: 8.0,
            tightness: 100.0,
            trim: true,
        }
    }
}

/// Complete configuration for one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Analysis sample rate in Hz
    pub sample_rate: u32,
    /// STFT frame length in samples
    pub n_fft: usize,
    /// Samples between onset frames
    pub hop_length: usize,
    /// Mel bands in the onset spectrogram
    pub n_mels: usize,
    pub segments: SegmentConfig,
    pub octave: OctaveRange,
    /// None disables calibration
    pub calibration: Option<Calibration>,
    pub cue: CueConfig,
    pub tracker: TrackerConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            segments: SegmentConfig::default(),
            octave: OctaveRange::default(),
            calibration: Some(Calibration::default()),
            cue: CueConfig::default(),
            tracker: TrackerConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set segment windowing
    pub fn with_segments(mut self, segments: SegmentConfig) -> Self {
        self.segments = segments;
        self
    }

    /// Set (or disable with None) the calibration offset
    pub fn with_calibration(mut self, calibration: Option<Calibration>) -> Self {
        self.calibration = calibration;
        self
    }

    /// Set the octave correction range
    pub fn with_octave_range(mut self, min_bpm: f64, max_bpm: f64) -> Self {
        self.octave = OctaveRange { min_bpm, max_bpm };
        self
    }

    pub fn with_cue(mut self, cue: CueConfig) -> Self {
        self.cue = cue;
        self
    }

    /// Onset frames per second
    pub fn frame_rate(&self) -> f64 {
        self.sample_rate as f64 / self.hop_length as f64
    }
}
