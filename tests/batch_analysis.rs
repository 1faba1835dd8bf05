use std::f32::consts::PI;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tempo_cue::analysis::AudioAnalyzer;
use tempo_cue::{AnalysisResult, BatchConfig, BatchPipeline, TempoAnalyzer};

/// Write a mono 16-bit WAV of decaying clicks at a fixed tempo
fn write_click_wav(path: &Path, bpm: f64, seconds: f64, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();

    let total = (sample_rate as f64 * seconds) as usize;
    let spacing = (60.0 / bpm * sample_rate as f64) as usize;
    let click_len = sample_rate as usize / 70;

    for i in 0..total {
        let offset = i % spacing;
        let value = if offset < click_len {
            let t = offset as f32 / sample_rate as f32;
            0.8 * (2.0 * PI * 1000.0 * t).sin() * (-t * 200.0).exp()
        } else {
            0.0
        };
        writer.write_sample((value * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Folder with two click tracks, a corrupt file and an unrelated file
fn create_test_folder() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_click_wav(&dir.path().join("a_house.wav"), 124.0, 20.0, 22050);
    write_click_wav(&dir.path().join("c_techno.wav"), 128.0, 20.0, 44100);
    fs::write(dir.path().join("b_broken.mp3"), b"not really an mp3").unwrap();
    fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
    dir
}

#[test]
fn test_failing_file_is_skipped() {
    let dir = create_test_folder();
    let config = BatchConfig::new(dir.path().to_path_buf());
    let pipeline = BatchPipeline::new(config, TempoAnalyzer::default()).unwrap();

    let report = pipeline.run().unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("b_broken.mp3"));

    let files: Vec<_> = report.results.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(files, vec!["a_house.wav", "c_techno.wav"]);

    // 512-sample hops quantise 124 BPM to 123.0 and 128 BPM to 129.2, then +2 calibration
    for (result, expected) in report.results.iter().zip([125.0, 131.2]) {
        assert!(
            (result.bpm_precise - expected).abs() < 1.5,
            "{}: {} BPM",
            result.file,
            result.bpm_precise
        );
        assert_eq!(result.bpm, result.bpm_precise.round() as u32);
        assert_eq!(result.duration, "00:20");
        assert!(result.cue_in_seconds < result.cue_out_seconds);
    }

    let summary = report.summary.unwrap();
    assert_eq!(summary.tracks, 2);
    assert!(summary.min_bpm <= summary.average_bpm);
    assert!(summary.average_bpm <= summary.max_bpm);
}

#[test]
fn test_results_file_is_written() {
    let dir = create_test_folder();
    let config = BatchConfig::new(dir.path().to_path_buf());
    let pipeline = BatchPipeline::new(config, TempoAnalyzer::default()).unwrap();

    let report = pipeline.run().unwrap();

    let output = dir.path().join("analysis_results.json");
    assert_eq!(report.output_path.as_deref(), Some(output.as_path()));

    let text = fs::read_to_string(&output).unwrap();
    for field in [
        "\"file\"",
        "\"bpm\"",
        "\"bpm_precise\"",
        "\"bpm_raw\"",
        "\"duration\"",
        "\"duration_seconds\"",
        "\"cue_in\"",
        "\"cue_in_seconds\"",
        "\"cue_out\"",
        "\"cue_out_seconds\"",
        "\"total_beats\"",
    ] {
        assert!(text.contains(field), "missing {}", field);
    }

    let parsed: Vec<AnalysisResult> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, report.results);
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = create_test_folder();

    let sequential = BatchPipeline::new(
        BatchConfig::new(dir.path().to_path_buf()).with_output_name("sequential.json"),
        TempoAnalyzer::default(),
    )
    .unwrap()
    .run()
    .unwrap();

    let parallel = BatchPipeline::new(
        BatchConfig::new(dir.path().to_path_buf())
            .with_output_name("parallel.json")
            .with_jobs(3),
        TempoAnalyzer::default(),
    )
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(sequential.results, parallel.results);
    assert_eq!(sequential.failed.len(), parallel.failed.len());
}

#[test]
fn test_no_successful_track_writes_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.wav"), b"RIFF garbage").unwrap();

    let pipeline =
        BatchPipeline::new(BatchConfig::new(dir.path().to_path_buf()), TempoAnalyzer::default())
            .unwrap();
    let report = pipeline.run().unwrap();

    assert!(report.results.is_empty());
    assert!(report.summary.is_none());
    assert!(report.output_path.is_none());
    assert!(!dir.path().join("analysis_results.json").exists());
}

#[test]
fn test_empty_folder_is_error() {
    let dir = TempDir::new().unwrap();
    let pipeline =
        BatchPipeline::new(BatchConfig::new(dir.path().to_path_buf()), TempoAnalyzer::default())
            .unwrap();

    assert!(pipeline.run().is_err());
}

#[test]
fn test_missing_folder_is_error() {
    let result = BatchPipeline::new(
        BatchConfig::new("/nonexistent/music".into()),
        TempoAnalyzer::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_analyzer_rate() {
    assert_eq!(TempoAnalyzer::default().sample_rate(), 22050);
}
