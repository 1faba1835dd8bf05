/// Decoded mono audio at the analysis sample rate
#[derive(Debug, Clone)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
    duration: f64,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Zero sample rate yields zero duration rather than a division by zero
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_sample_count() {
        let waveform = Waveform::new(vec![0.0; 22050 * 3], 22050);
        assert_eq!(waveform.duration(), 3.0);
        assert_eq!(waveform.len(), 66150);
    }

    #[test]
    fn test_zero_sample_rate() {
        let waveform = Waveform::new(vec![0.0; 100], 0);
        assert_eq!(waveform.duration(), 0.0);
    }
}
