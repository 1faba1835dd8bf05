//! Tempo reconciliation
//!
//! Median of all estimates, folded by whole octaves into the expected range,
//! then shifted by the calibration offset. Order matters: the fold doubles
//! first and halves second.

use super::beat::median_of;
use super::config::{AnalysisConfig, Calibration, OctaveRange};
use crate::error::AnalysisError;
use crate::model::result::round_to;
use crate::model::TempoEstimate;

/// Upper bound on doublings or halvings; a finite positive f64 needs far fewer
const MAX_OCTAVE_STEPS: usize = 2100;

/// Final tempo figures for one track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciledTempo {
    /// Median estimate, 1 decimal, before correction and calibration
    pub raw_bpm: f64,
    /// Median after octave correction
    pub corrected_bpm: f64,
    /// Calibrated tempo, 1 decimal
    pub bpm_precise: f64,
    /// Calibrated tempo, nearest integer
    pub bpm: u32,
}

pub struct TempoReconciler {
    octave: OctaveRange,
    calibration: Option<Calibration>,
}

impl TempoReconciler {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            octave: config.octave,
            calibration: config.calibration,
        }
    }

    pub fn reconcile(&self, estimates: &[TempoEstimate]) -> Result<ReconciledTempo, AnalysisError> {
        let mut values: Vec<f64> = estimates.iter().map(|e| e.bpm).collect();
        let raw = median_of(&mut values).ok_or(AnalysisError::NoTempoData)?;

        let corrected = self.octave_correct(raw)?;
        let offset = self
            .calibration
            .map_or(0.0, |cal| cal.offset_for(corrected));
        let calibrated = corrected + offset;

        if (raw - calibrated).abs() > 1.0 {
            log::debug!("Raw: {:.1} → Calibrated: {:.1}", raw, calibrated);
        }

        Ok(ReconciledTempo {
            raw_bpm: round_to(raw, 1),
            corrected_bpm: corrected,
            bpm_precise: round_to(calibrated, 1),
            bpm: calibrated.round() as u32,
        })
    }

    /// Double while below the range, then halve while above it
    pub fn octave_correct(&self, bpm: f64) -> Result<f64, AnalysisError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(AnalysisError::InvalidTempoValue(bpm));
        }

        let mut corrected = bpm;
        let mut steps = 0;
        while corrected < self.octave.min_bpm {
            corrected *= 2.0;
            steps += 1;
            if steps > MAX_OCTAVE_STEPS {
                return Err(AnalysisError::InvalidTempoValue(bpm));
            }
        }
        while corrected > self.octave.max_bpm {
            corrected /= 2.0;
            steps += 1;
            if steps > MAX_OCTAVE_STEPS {
                return Err(AnalysisError::InvalidTempoValue(bpm));
            }
        }

        if steps > 0 {
            log::debug!("Octave correction: {:.2} → {:.2} BPM", bpm, corrected);
        }
        Ok(corrected)
    }
}
