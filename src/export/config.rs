//! Batch configuration

use std::path::PathBuf;

/// Extensions picked up by the folder scan (compared case-insensitively)
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a", "ogg"];

/// Default name of the results file written into the scanned folder
pub const DEFAULT_OUTPUT_NAME: &str = "analysis_results.json";

/// Configuration for one batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Folder containing the audio files
    pub folder: PathBuf,

    /// Results file name, written inside `folder`
    pub output_name: String,

    /// Worker threads; 1 analyzes files one after another
    pub jobs: usize,
}

impl BatchConfig {
    /// Create a new batch configuration
    pub fn new(folder: PathBuf) -> Self {
        Self {
            folder,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            jobs: 1,
        }
    }

    /// Set the results file name
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Set the number of parallel workers (at least 1)
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Full path of the results file
    pub fn output_path(&self) -> PathBuf {
        self.folder.join(&self.output_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let config = BatchConfig::new(PathBuf::from("/music/house"));
        assert_eq!(
            config.output_path(),
            PathBuf::from("/music/house/analysis_results.json")
        );

        let config = config.with_output_name("bpm.json").with_jobs(0);
        assert_eq!(config.output_path(), PathBuf::from("/music/house/bpm.json"));
        assert_eq!(config.jobs, 1);
    }
}
