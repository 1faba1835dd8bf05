//! Tempo and cue point analyzer
//!
//! Wires the stages together: onset envelope → tempo estimates → reconciled
//! BPM → cue points → result record.

use super::config::AnalysisConfig;
use super::cue::CueSelector;
use super::reconcile::TempoReconciler;
use super::tempo::TempoEstimator;
use super::traits::AudioAnalyzer;
use crate::error::AnalysisError;
use crate::model::{AnalysisResult, Waveform};

pub struct TempoAnalyzer {
    config: AnalysisConfig,
    estimator: TempoEstimator,
    reconciler: TempoReconciler,
    cues: CueSelector,
}

impl TempoAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            estimator: TempoEstimator::new(&config),
            reconciler: TempoReconciler::new(&config),
            cues: CueSelector::new(config.cue),
            config,
        }
    }
}

impl Default for TempoAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl AudioAnalyzer for TempoAnalyzer {
    fn analyze(&self, file: &str, waveform: &Waveform) -> Result<AnalysisResult, AnalysisError> {
        log::debug!(
            "Analyzing {}: {:.1}s at {}Hz",
            file,
            waveform.duration(),
            waveform.sample_rate()
        );

        if waveform.sample_rate() != self.config.sample_rate {
            log::warn!(
                "{}: waveform at {}Hz, analysis expects {}Hz",
                file,
                waveform.sample_rate(),
                self.config.sample_rate
            );
        }

        let estimation = self.estimator.estimate(waveform)?;

        if estimation.beats.is_empty()
            && waveform.duration() < self.config.segments.min_segment_seconds
        {
            return Err(AnalysisError::InsufficientAudio(format!(
                "{:.1}s and no beats detected",
                waveform.duration()
            )));
        }

        let tempo = self.reconciler.reconcile(&estimation.estimates)?;
        let cues = self
            .cues
            .select(&estimation.beats.times(), waveform.duration());

        let result = AnalysisResult::assemble(
            file,
            waveform.duration(),
            &tempo,
            &cues,
            estimation.beats.len(),
        );

        log::info!(
            "{}: BPM {} ({} rounded), cue in {}, cue out {}",
            file,
            result.bpm_precise,
            result.bpm,
            result.cue_in,
            result.cue_out
        );

        Ok(result)
    }

    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 22050;

    /// Decaying 1 kHz clicks at a fixed tempo
    fn click_track(bpm: f64, seconds: f64) -> Waveform {
        let total = (SR as f64 * seconds) as usize;
        let mut samples = vec![0.0f32; total];
        let spacing = 60.0 / bpm * SR as f64;
        let mut pos = 0.0;
        while (pos as usize) < total {
            let start = pos as usize;
            for j in 0..300.min(total - start) {
                let t = j as f32 / SR as f32;
                samples[start + j] =
                    0.8 * (2.0 * std::f32::consts::PI * 1000.0 * t).sin() * (-t * 200.0).exp();
            }
            pos += spacing;
        }
        Waveform::new(samples, SR)
    }

    #[test]
    fn test_click_track_tempo() {
        let analyzer = TempoAnalyzer::default();
        let waveform = click_track(128.0, 40.0);

        let result = analyzer.analyze("clicks.wav", &waveform).unwrap();

        // Period rounds to 20 frames of 512 samples (129.2 BPM), plus the +2 calibration
        assert!(
            (result.bpm_precise - 131.2).abs() < 0.05,
            "got {}",
            result.bpm_precise
        );
        assert_eq!(result.bpm, 131);
        assert!((result.bpm_raw - 129.2).abs() < 0.05, "got {}", result.bpm_raw);
        assert!(result.total_beats > 32, "only {} beats", result.total_beats);
        assert_eq!(result.duration, "00:40");
        assert!(result.cue_in_seconds < result.cue_out_seconds);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let analyzer = TempoAnalyzer::default();
        let waveform = click_track(124.0, 20.0);

        let first = analyzer.analyze("a.wav", &waveform).unwrap();
        let second = analyzer.analyze("a.wav", &waveform).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_short_silent_audio_is_insufficient() {
        let analyzer = TempoAnalyzer::default();
        let waveform = Waveform::new(vec![0.0; SR as usize * 2], SR);

        let result = analyzer.analyze("short.wav", &waveform);

        assert!(matches!(result, Err(AnalysisError::InsufficientAudio(_))));
    }

    #[test]
    fn test_empty_audio_is_insufficient() {
        let analyzer = TempoAnalyzer::default();
        let result = analyzer.analyze("empty.wav", &Waveform::new(Vec::new(), SR));
        assert!(matches!(result, Err(AnalysisError::InsufficientAudio(_))));
    }

    #[test]
    fn test_long_silence_has_no_tempo() {
        let analyzer = TempoAnalyzer::default();
        let waveform = Waveform::new(vec![0.0; SR as usize * 8], SR);

        let result = analyzer.analyze("silence.wav", &waveform);

        assert!(matches!(result, Err(AnalysisError::InvalidTempoValue(_))));
    }

    #[test]
    fn test_sparse_beats_fall_back_to_fractions() {
        let analyzer = TempoAnalyzer::default();
        // 8 s at 120 BPM is about 16 beats
        let waveform = click_track(120.0, 8.0);

        let result = analyzer.analyze("short-clicks.wav", &waveform).unwrap();

        assert!(result.total_beats <= 32);
        assert_eq!(result.cue_in_seconds, 0.8);
        assert_eq!(result.cue_out_seconds, 7.2);
    }
}
