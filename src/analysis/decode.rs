//! Audio decoding to a mono waveform at the analysis sample rate
//!
//! Decoding uses symphonia; channels are averaged, then rubato resamples when
//! the file's rate differs from the analysis rate.

use crate::error::AnalysisError;
use crate::model::Waveform;
use anyhow::{Context, Result};
use rubato::{FftFixedIn, Resampler};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Input frames per resampler call
const RESAMPLE_CHUNK: usize = 1024;

/// Decode an audio file into a mono waveform at `target_sr`
pub fn load_waveform(path: &Path, target_sr: u32) -> Result<Waveform, AnalysisError> {
    let (samples, source_sr) =
        decode_to_mono(path).map_err(|e| AnalysisError::decode(path, format!("{:#}", e)))?;

    log::debug!(
        "Decoded {} samples ({:.1}s) at {}Hz",
        samples.len(),
        samples.len() as f32 / source_sr as f32,
        source_sr
    );

    let samples = if source_sr == target_sr {
        samples
    } else {
        resample(&samples, source_sr, target_sr)
            .map_err(|e| AnalysisError::decode(path, format!("{:#}", e)))?
    };

    Ok(Waveform::new(samples, target_sr))
}

/// Decode audio file to mono f32 samples at the file's own rate
fn decode_to_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {:?}", path))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(ext.to_str().unwrap_or(""));
    }

    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .with_context(|| format!("Failed to probe audio format: {:?}", path))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("No sample rate in audio track")?;

    let dec_opts = DecoderOptions::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .context("Failed to create audio decoder")?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Error reading packet: {:?}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Error decoding packet: {:?}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        let duration = decoded.capacity() as u64;

        let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();

        // Average every channel down to mono
        let channels = spec.channels.count().max(1);
        all_samples.extend(
            samples
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    Ok((all_samples, sample_rate))
}

/// Resample a mono signal, compensating for the resampler delay
fn resample(samples: &[f32], source_sr: u32, target_sr: u32) -> Result<Vec<f32>> {
    let mut resampler = FftFixedIn::<f32>::new(
        source_sr as usize,
        target_sr as usize,
        RESAMPLE_CHUNK,
        2,
        1,
    )
    .context("Failed to create resampler")?;

    let delay = resampler.output_delay();
    let expected =
        (samples.len() as f64 * target_sr as f64 / source_sr as f64).round() as usize;

    let mut output = vec![vec![0.0f32; resampler.output_frames_max()]; 1];
    let mut resampled = Vec::with_capacity(expected + delay);

    let mut chunks = samples.chunks_exact(RESAMPLE_CHUNK);
    for chunk in &mut chunks {
        let (_, out_len) = resampler
            .process_into_buffer(&[chunk], &mut output, None)
            .context("Resampling failed")?;
        resampled.extend_from_slice(&output[0][..out_len]);
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let (_, out_len) = resampler
            .process_partial_into_buffer(Some(&[remainder][..]), &mut output, None)
            .context("Resampling failed")?;
        resampled.extend_from_slice(&output[0][..out_len]);
    }

    // Flush the delay line
    while resampled.len() < expected + delay {
        let (_, out_len) = resampler
            .process_partial_into_buffer(None::<&[&[f32]]>, &mut output, None)
            .context("Resampling failed")?;
        if out_len == 0 {
            break;
        }
        resampled.extend_from_slice(&output[0][..out_len]);
    }

    resampled.drain(..delay.min(resampled.len()));
    resampled.truncate(expected);

    log::debug!(
        "Resampled {} → {} samples ({}Hz → {}Hz)",
        samples.len(),
        resampled.len(),
        source_sr,
        target_sr
    );

    Ok(resampled)
}
