//! Onset strength envelope
//!
//! Spectral flux on a log-power mel spectrogram:
//! 1. Centered STFT with a periodic Hann window
//! 2. Power spectrum mapped onto mel bands
//! 3. Decibels relative to the loudest cell, clipped 80 dB below it
//! 4. Half-wave rectified frame-to-frame difference, averaged over bands

use super::config::AnalysisConfig;
use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Floor applied before taking logarithms
const AMIN: f32 = 1e-10;
/// Dynamic range kept below the spectrogram peak
const TOP_DB: f32 = 80.0;

/// Onset strength, one value per analysis frame
#[derive(Debug, Clone, PartialEq)]
pub struct OnsetEnvelope {
    values: Vec<f32>,
    hop_length: usize,
    sample_rate: u32,
}

impl OnsetEnvelope {
    pub fn new(values: Vec<f32>, hop_length: usize, sample_rate: u32) -> Self {
        Self {
            values,
            hop_length,
            sample_rate,
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f64 {
        self.sample_rate as f64 / self.hop_length as f64
    }

    /// True when no frame carries any onset energy
    pub fn is_silent(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

/// Triangular mel filter stored as a run of non-zero bin weights
#[derive(Debug, Clone)]
struct MelFilter {
    first_bin: usize,
    weights: Vec<f32>,
}

impl MelFilter {
    fn apply(&self, power: &[f32]) -> f32 {
        self.weights
            .iter()
            .zip(&power[self.first_bin..])
            .map(|(w, p)| w * p)
            .sum()
    }
}

/// Computes onset envelopes for waveforms at one sample rate
pub struct OnsetExtractor {
    n_fft: usize,
    hop_length: usize,
    sample_rate: u32,
    window: Vec<f32>,
    filters: Vec<MelFilter>,
    fft: Arc<dyn Fft<f32>>,
}

impl OnsetExtractor {
    pub fn new(config: &AnalysisConfig) -> Self {
        let n_fft = config.n_fft;
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n_fft);

        Self {
            n_fft,
            hop_length: config.hop_length,
            sample_rate: config.sample_rate,
            window: hann_window(n_fft),
            filters: mel_filterbank(config.sample_rate, n_fft, config.n_mels),
            fft,
        }
    }

    /// Minimum number of samples the extractor accepts
    pub fn min_samples(&self) -> usize {
        self.n_fft
    }

    /// Compute the onset envelope of a mono signal
    pub fn extract(&self, samples: &[f32]) -> Result<OnsetEnvelope, AnalysisError> {
        if samples.len() < self.n_fft {
            return Err(AnalysisError::InsufficientAudio(format!(
                "{} samples, need at least {}",
                samples.len(),
                self.n_fft
            )));
        }

        let mel_db = self.log_mel_spectrogram(samples);

        let mut values = Vec::with_capacity(mel_db.len());
        values.push(0.0);
        for pair in mel_db.windows(2) {
            let flux: f32 = pair[1]
                .iter()
                .zip(&pair[0])
                .map(|(cur, prev)| (cur - prev).max(0.0))
                .sum();
            values.push(flux / self.filters.len().max(1) as f32);
        }

        log::debug!(
            "Onset envelope: {} frames from {} samples",
            values.len(),
            samples.len()
        );

        Ok(OnsetEnvelope::new(values, self.hop_length, self.sample_rate))
    }

    /// Mel spectrogram in dB, one row per frame
    fn log_mel_spectrogram(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        let n_frames = 1 + samples.len() / self.hop_length;
        let n_bins = self.n_fft / 2 + 1;
        let pad = self.n_fft / 2;

        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.n_fft];
        let mut power = vec![0.0f32; n_bins];
        let mut mel = Vec::with_capacity(n_frames);
        let mut peak = AMIN;

        for frame in 0..n_frames {
            // Frame is centered on frame * hop; samples outside the signal are zero
            let center = frame * self.hop_length;
            for (i, slot) in buffer.iter_mut().enumerate() {
                let sample = (center + i)
                    .checked_sub(pad)
                    .and_then(|idx| samples.get(idx))
                    .copied()
                    .unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[i], 0.0);
            }

            self.fft.process(&mut buffer);

            for (p, c) in power.iter_mut().zip(&buffer[..n_bins]) {
                *p = c.norm_sqr();
            }

            let row: Vec<f32> = self.filters.iter().map(|f| f.apply(&power)).collect();
            peak = row.iter().copied().fold(peak, f32::max);
            mel.push(row);
        }

        let ref_db = 10.0 * peak.max(AMIN).log10();
        let floor = -TOP_DB;
        for row in mel.iter_mut() {
            for v in row.iter_mut() {
                *v = (10.0 * v.max(AMIN).log10() - ref_db).max(floor);
            }
        }

        mel
    }
}

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / size as f32;
            0.5 - 0.5 * (2.0 * std::f32::consts::PI * t).cos()
        })
        .collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular filters evenly spaced on the mel scale from 0 Hz to Nyquist
fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Vec<MelFilter> {
    let n_bins = n_fft / 2 + 1;
    let nyquist = sample_rate as f64 / 2.0;
    let max_mel = hz_to_mel(nyquist);

    let edges: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(max_mel * i as f64 / (n_mels + 1) as f64))
        .collect();
    let bin_hz = |k: usize| k as f64 * sample_rate as f64 / n_fft as f64;

    edges
        .windows(3)
        .map(|e| {
            let (lo, mid, hi) = (e[0], e[1], e[2]);
            let weights: Vec<(usize, f32)> = (0..n_bins)
                .filter_map(|k| {
                    let f = bin_hz(k);
                    let rising = (f - lo) / (mid - lo);
                    let falling = (hi - f) / (hi - mid);
                    let w = rising.min(falling);
                    (w > 0.0).then_some((k, w as f32))
                })
                .collect();

            match weights.first() {
                Some(&(first_bin, _)) => MelFilter {
                    first_bin,
                    weights: weights.iter().map(|&(_, w)| w).collect(),
                },
                // Narrow low bands can fall between FFT bins
                None => MelFilter {
                    first_bin: 0,
                    weights: Vec::new(),
                },
            }
        })
        .collect()
}
