//! Cue point selection from the beat grid
//!
//! Heuristic, not structural detection: the mix-in point sits one phrase
//! (8 bars of 4/4) after the first beat, the mix-out point one phrase before
//! the last. Tracks with too few beats fall back to fixed fractions.

use super::config::CueConfig;

/// Suggested mix points in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CuePoints {
    pub cue_in: f64,
    pub cue_out: f64,
}

pub struct CueSelector {
    config: CueConfig,
}

impl CueSelector {
    pub fn new(config: CueConfig) -> Self {
        Self { config }
    }

    /// Pick cue points from beat times (seconds) and the track duration
    pub fn select(&self, beat_times: &[f64], duration: f64) -> CuePoints {
        let phrase = self.config.intro_beats;

        if beat_times.len() > phrase {
            // A zero-beat phrase puts cue-out on the last beat
            CuePoints {
                cue_in: beat_times[phrase],
                cue_out: beat_times[beat_times.len() - phrase.max(1)],
            }
        } else {
            log::debug!(
                "Only {} beats, using duration fractions for cue points",
                beat_times.len()
            );
            CuePoints {
                cue_in: duration * self.config.fallback_in,
                cue_out: duration * self.config.fallback_out,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> CueSelector {
        CueSelector::new(CueConfig::default())
    }

    #[test]
    fn test_fallback_with_sparse_beats() {
        let beats: Vec<f64> = (0..32).map(|i| i as f64 * 0.5).collect();
        let cues = selector().select(&beats, 200.0);
        assert_eq!(cues.cue_in, 20.0);
        assert_eq!(cues.cue_out, 180.0);
    }

    #[test]
    fn test_fallback_without_beats() {
        let cues = selector().select(&[], 200.0);
        assert_eq!(cues.cue_in, 20.0);
        assert_eq!(cues.cue_out, 180.0);
    }

    #[test]
    fn test_beat_based_cues() {
        let mut beats: Vec<f64> = (0..100).map(|i| i as f64 * 1.7).collect();
        beats[32] = 15.3;
        beats[68] = 185.7;

        let cues = selector().select(&beats, 200.0);

        assert_eq!(cues.cue_in, 15.3);
        assert_eq!(cues.cue_out, 185.7);
    }

    #[test]
    fn test_thirty_three_beats_is_enough() {
        let beats: Vec<f64> = (0..33).map(|i| i as f64).collect();
        let cues = selector().select(&beats, 100.0);
        assert_eq!(cues.cue_in, 32.0);
        assert_eq!(cues.cue_out, 1.0);
    }

    #[test]
    fn test_zero_phrase_uses_first_and_last_beat() {
        let selector = CueSelector::new(CueConfig {
            intro_beats: 0,
            ..CueConfig::default()
        });
        let beats: Vec<f64> = (0..10).map(|i| i as f64).collect();

        let cues = selector.select(&beats, 100.0);

        assert_eq!(cues.cue_in, 0.0);
        assert_eq!(cues.cue_out, 9.0);

        // No beats still falls back to fractions
        let cues = selector.select(&[], 100.0);
        assert_eq!(cues.cue_in, 10.0);
        assert_eq!(cues.cue_out, 90.0);
    }
}
