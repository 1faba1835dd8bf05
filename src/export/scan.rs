//! Audio file discovery

use super::config::AUDIO_EXTENSIONS;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List audio files directly inside `folder`, sorted by path
pub fn find_audio_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read folder: {:?}", folder))?;
        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    log::debug!("Found {} audio file(s) in {:?}", files.len(), folder);
    Ok(files)
}

/// Check the extension against the supported list, ignoring case
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("a.mp3")));
        assert!(is_audio_file(Path::new("b.FLAC")));
        assert!(is_audio_file(Path::new("c.Ogg")));
        assert!(!is_audio_file(Path::new("d.txt")));
        assert!(!is_audio_file(Path::new("noext")));
    }

    #[test]
    fn test_scan_is_flat_and_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.wav"), b"x").unwrap();
        fs::write(dir.path().join("a.MP3"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.wav"), b"x").unwrap();

        let files = find_audio_files(dir.path()).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.MP3", "b.wav"]);
    }

    #[test]
    fn test_missing_folder_is_error() {
        assert!(find_audio_files(Path::new("/nonexistent/folder")).is_err());
    }
}
