//! Tempo estimation and beat tracking on a single onset envelope
//!
//! Tempo comes from the time-averaged autocorrelation tempogram weighted by a
//! log-normal prior around 120 BPM. Beats are placed by dynamic programming
//! (Ellis 2007): every frame picks the best previous beat roughly one period
//! back, and the best chain is followed backwards from the last strong beat.

use super::config::TrackerConfig;
use super::onset::OnsetEnvelope;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Outcome of one beat-tracking pass
#[derive(Debug, Clone, PartialEq)]
pub struct BeatTrack {
    /// Estimated tempo, 0.0 when the envelope carries no onsets
    pub bpm: f64,
    /// Beat frame indices in increasing order
    pub beats: Vec<usize>,
}

pub struct BeatTracker {
    config: TrackerConfig,
}

impl BeatTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    /// Estimate the tempo and place beats
    pub fn track(&self, onset: &OnsetEnvelope) -> BeatTrack {
        if onset.is_empty() || onset.is_silent() {
            log::debug!("Onset envelope is silent, no beats");
            return BeatTrack {
                bpm: 0.0,
                beats: Vec::new(),
            };
        }

        let bpm = self.estimate_tempo(onset);
        let beats = if bpm > 0.0 {
            self.place_beats(onset, bpm)
        } else {
            Vec::new()
        };

        log::debug!("Beat track: {:.2} BPM, {} beats", bpm, beats.len());
        BeatTrack { bpm, beats }
    }

    /// Tempo in BPM from the tempogram, 0.0 if no lag qualifies
    pub fn estimate_tempo(&self, onset: &OnsetEnvelope) -> f64 {
        let frame_rate = onset.frame_rate();
        let win = ((self.config.ac_size_seconds * frame_rate).round() as usize).max(2);
        let tempogram = tempogram_mean(onset.values(), win);

        let log_start = self.config.start_bpm.log2();
        let mut best: Option<(usize, f64)> = None;

        for (lag, &strength) in tempogram.iter().enumerate().skip(1) {
            let bpm = 60.0 * frame_rate / lag as f64;
            if bpm >= self.config.max_tempo {
                continue;
            }
            let prior = -0.5 * ((bpm.log2() - log_start) / self.config.std_bpm).powi(2);
            let score = (1e6 * strength.max(0.0)).ln_1p() + prior;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((lag, score));
            }
        }

        best.map(|(lag, _)| 60.0 * frame_rate / lag as f64)
            .unwrap_or(0.0)
    }

    /// Dynamic-programming beat placement for a known tempo
    pub fn place_beats(&self, onset: &OnsetEnvelope, bpm: f64) -> Vec<usize> {
        let period = (60.0 * onset.frame_rate() / bpm).round() as usize;
        if period == 0 {
            return Vec::new();
        }

        let local = local_score(onset.values(), period);
        let (backlink, cumulative) = beat_dp(&local, period, self.config.tightness);

        let Some(tail) = last_beat(&cumulative) else {
            return Vec::new();
        };

        let mut beats = vec![tail];
        let mut current = tail;
        while let Some(prev) = backlink[current] {
            beats.push(prev);
            current = prev;
        }
        beats.reverse();

        if self.config.trim {
            trim_beats(&local, beats)
        } else {
            beats
        }
    }
}

/// Autocorrelation tempogram averaged over time
///
/// Each column is the autocorrelation of a Hann-weighted window of the
/// envelope centered on one frame, normalised by its lag-0 value. Returns
/// the mean strength per lag, `win` values starting at lag 0.
pub fn tempogram_mean(onset: &[f32], win: usize) -> Vec<f64> {
    let mut mean = vec![0.0f64; win];
    if onset.is_empty() || win == 0 {
        return mean;
    }

    let fft_len = (2 * win - 1).next_power_of_two();
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(fft_len);
    let ifft = planner.plan_fft_inverse(fft_len);

    let window: Vec<f32> = (0..win)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / win as f32).cos())
        .collect();
    let half = win / 2;
    let mut buffer = vec![Complex::new(0.0f32, 0.0); fft_len];

    for center in 0..onset.len() {
        for (j, slot) in buffer.iter_mut().enumerate() {
            let value = if j < win {
                (center + j)
                    .checked_sub(half)
                    .and_then(|idx| onset.get(idx))
                    .map_or(0.0, |v| v * window[j])
            } else {
                0.0
            };
            *slot = Complex::new(value, 0.0);
        }

        // Wiener-Khinchin: autocorrelation is the inverse transform of the power spectrum
        fft.process(&mut buffer);
        for c in buffer.iter_mut() {
            *c = Complex::new(c.norm_sqr(), 0.0);
        }
        ifft.process(&mut buffer);

        let lag0 = buffer[0].re;
        if lag0 > 0.0 {
            for (acc, c) in mean.iter_mut().zip(&buffer[..win]) {
                *acc += (c.re / lag0) as f64;
            }
        }
    }

    let n = onset.len() as f64;
    for v in mean.iter_mut() {
        *v /= n;
    }
    mean
}

/// Onsets normalised by their standard deviation, smoothed with a Gaussian
/// one period wide
fn local_score(onset: &[f32], period: usize) -> Vec<f64> {
    let n = onset.len();
    let mean = onset.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let var = if n > 1 {
        onset
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64
    } else {
        0.0
    };
    let std = var.sqrt();
    let norm: Vec<f64> = onset
        .iter()
        .map(|&v| if std > 0.0 { v as f64 / std } else { v as f64 })
        .collect();

    let p = period as f64;
    let kernel: Vec<f64> = (-(period as isize)..=period as isize)
        .map(|k| (-0.5 * (k as f64 * 32.0 / p).powi(2)).exp())
        .collect();

    convolve_same(&norm, &kernel)
}

/// Discrete convolution keeping the input length, kernel centered
fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let half = (kernel.len() / 2) as isize;
    (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, w)| {
                    let idx = i as isize + half - k as isize;
                    (idx >= 0 && (idx as usize) < n).then(|| signal[idx as usize] * w)
                })
                .sum()
        })
        .collect()
}

/// Cumulative beat score with backlinks to the best previous beat
fn beat_dp(local: &[f64], period: usize, tightness: f64) -> (Vec<Option<usize>>, Vec<f64>) {
    let n = local.len();
    let p = period as f64;
    let max_local = local.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Predecessor offsets from -2p to -round(p/2)
    let min_back = (p / 2.0).round() as isize;
    let offsets: Vec<isize> = (-2 * period as isize..=-min_back).collect();
    let penalty: Vec<f64> = offsets
        .iter()
        .map(|&o| -tightness * ((-o) as f64 / p).ln().powi(2))
        .collect();

    let mut backlink = vec![None; n];
    let mut cumulative = vec![0.0f64; n];
    let mut first_beat = true;

    for i in 0..n {
        let mut best: Option<(isize, f64)> = None;
        for (&offset, &pen) in offsets.iter().zip(&penalty) {
            let j = i as isize + offset;
            let candidate = if j >= 0 {
                pen + cumulative[j as usize]
            } else {
                pen
            };
            if best.map_or(true, |(_, s)| candidate > s) {
                best = Some((j, candidate));
            }
        }

        let (prev, score) = best.unwrap_or((-1, 0.0));
        cumulative[i] = local[i] + score;

        // Nothing links back before the first onset worth a beat
        if first_beat && local[i] < 0.01 * max_local {
            backlink[i] = None;
        } else {
            backlink[i] = usize::try_from(prev).ok();
            first_beat = false;
        }
    }

    (backlink, cumulative)
}

/// Last local maximum of the cumulative score above half the median maximum
fn last_beat(cumulative: &[f64]) -> Option<usize> {
    let n = cumulative.len();
    let maxima: Vec<usize> = (1..n)
        .filter(|&i| {
            cumulative[i] > cumulative[i - 1] && (i + 1 == n || cumulative[i] >= cumulative[i + 1])
        })
        .collect();
    if maxima.is_empty() {
        return None;
    }

    let mut scores: Vec<f64> = maxima.iter().map(|&i| cumulative[i]).collect();
    let median = median_of(&mut scores)?;

    maxima
        .iter()
        .rev()
        .copied()
        .find(|&i| cumulative[i] * 2.0 > median)
}

/// Drop weak leading and trailing beats
fn trim_beats(local: &[f64], beats: Vec<usize>) -> Vec<usize> {
    if beats.is_empty() {
        return beats;
    }

    let strengths: Vec<f64> = beats.iter().map(|&b| local[b]).collect();
    let smooth = convolve_same(&strengths, &[0.0, 0.5, 1.0, 0.5, 0.0]);
    let rms = (smooth.iter().map(|v| v * v).sum::<f64>() / smooth.len() as f64).sqrt();
    let threshold = 0.5 * rms;

    let first = smooth.iter().position(|&v| v > threshold);
    let last = smooth.iter().rposition(|&v| v > threshold);
    match (first, last) {
        (Some(first), Some(last)) => beats[first..=last].to_vec(),
        _ => Vec::new(),
    }
}

/// Median, averaging the two middle values for even counts
pub fn median_of(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
