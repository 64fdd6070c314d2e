//! Collaborators that sit in front of the decoder: fetching audio and turning
//! it into beat-synchronous chroma.
//!
//! Real deployments plug in a downloader and a DSP front end. The adapters
//! here work purely off the local filesystem.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::BeatFeatures;
use crate::{Error, Result};

/// A fetched audio file on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHandle {
    pub path: PathBuf,
}

/// Resolves a source reference (URL, media id, path) to local audio.
pub trait AudioSource: Send + Sync {
    fn fetch_audio(&self, source_ref: &str) -> Result<AudioHandle>;
}

/// Produces beat-synchronous chroma, beat times and a tempo from audio.
pub trait FeatureExtractor: Send + Sync {
    fn extract_features(&self, audio: &AudioHandle) -> Result<BeatFeatures>;
}

/// Serves audio already present on disk.
///
/// Absolute references are used as-is; anything else is looked up under
/// `audio_dir`.
pub struct LocalAudioSource {
    audio_dir: PathBuf,
}

impl LocalAudioSource {
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
        }
    }

    fn resolve(&self, source_ref: &str) -> PathBuf {
        let candidate = Path::new(source_ref);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.audio_dir.join(candidate)
        }
    }
}

impl AudioSource for LocalAudioSource {
    fn fetch_audio(&self, source_ref: &str) -> Result<AudioHandle> {
        if source_ref.trim().is_empty() {
            return Err(Error::SourceNotFound(source_ref.to_string()));
        }

        let path = self.resolve(source_ref);
        if !path.is_file() {
            return Err(Error::SourceNotFound(source_ref.to_string()));
        }

        debug!(path = %path.display(), "resolved local audio");
        Ok(AudioHandle { path })
    }
}

/// Reads features precomputed into `<audio>.chroma.json` next to the audio.
pub struct SidecarFeatureExtractor;

impl SidecarFeatureExtractor {
    pub const SUFFIX: &'static str = "chroma.json";

    pub fn sidecar_path(audio: &Path) -> PathBuf {
        let mut name = audio.as_os_str().to_os_string();
        name.push(".");
        name.push(Self::SUFFIX);
        PathBuf::from(name)
    }
}

impl FeatureExtractor for SidecarFeatureExtractor {
    fn extract_features(&self, audio: &AudioHandle) -> Result<BeatFeatures> {
        let path = Self::sidecar_path(&audio.path);
        read_features(&path)
    }
}

/// Load a `BeatFeatures` JSON document.
pub fn read_features(path: &Path) -> Result<BeatFeatures> {
    let extraction_error = |message: String| Error::Extraction {
        path: path.to_path_buf(),
        message,
    };

    let json = std::fs::read_to_string(path).map_err(|e| extraction_error(e.to_string()))?;
    let features: BeatFeatures =
        serde_json::from_str(&json).map_err(|e| extraction_error(e.to_string()))?;

    debug!(
        path = %path.display(),
        beats = features.chroma.len(),
        tempo = features.tempo,
        "loaded beat features"
    );
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_audio_is_not_found() {
        let dir = TempDir::new().unwrap();
        let source = LocalAudioSource::new(dir.path());
        assert!(matches!(
            source.fetch_audio("nope.mp3"),
            Err(Error::SourceNotFound(r)) if r == "nope.mp3"
        ));
        assert!(matches!(source.fetch_audio("  "), Err(Error::SourceNotFound(_))));
    }

    #[test]
    fn relative_and_absolute_refs_resolve() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("song.mp3");
        std::fs::write(&audio, b"ID3").unwrap();

        let source = LocalAudioSource::new(dir.path());
        assert_eq!(source.fetch_audio("song.mp3").unwrap().path, audio);

        let absolute = audio.to_string_lossy().to_string();
        let elsewhere = LocalAudioSource::new("/nonexistent");
        assert_eq!(elsewhere.fetch_audio(&absolute).unwrap().path, audio);
    }

    #[test]
    fn sidecar_path_appends_suffix() {
        let path = SidecarFeatureExtractor::sidecar_path(Path::new("/a/song.mp3"));
        assert_eq!(path, PathBuf::from("/a/song.mp3.chroma.json"));
    }

    #[test]
    fn sidecar_features_load() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("song.mp3");
        let sidecar = SidecarFeatureExtractor::sidecar_path(&audio);
        std::fs::write(
            &sidecar,
            r#"{"chroma": [[1,0,0,0,1,0,0,1,0,0,0,0]], "beat_times": [0.5], "tempo": 118.2}"#,
        )
        .unwrap();

        let features = SidecarFeatureExtractor
            .extract_features(&AudioHandle { path: audio })
            .unwrap();
        assert_eq!(features.chroma.len(), 1);
        assert_eq!(features.chroma[0][4], 1.0);
        assert_eq!(features.beat_times, vec![0.5]);
        assert_eq!(features.tempo, 118.2);
    }

    #[test]
    fn malformed_sidecar_is_extraction_error() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("song.mp3");
        std::fs::write(SidecarFeatureExtractor::sidecar_path(&audio), "{\"chroma\": 3}").unwrap();

        let err = SidecarFeatureExtractor
            .extract_features(&AudioHandle { path: audio })
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn missing_sidecar_is_extraction_error() {
        let dir = TempDir::new().unwrap();
        let err = SidecarFeatureExtractor
            .extract_features(&AudioHandle {
                path: dir.path().join("song.mp3"),
            })
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
