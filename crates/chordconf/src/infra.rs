//! Where audio lives and how loudly to log.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Filesystem paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory that relative source references resolve against.
    /// Default: ~/.local/share/chordline/audio
    #[serde(default = "PathsConfig::default_audio_dir")]
    pub audio_dir: PathBuf,
}

impl PathsConfig {
    fn default_audio_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.data_dir().join("chordline/audio"))
            .unwrap_or_else(|| PathBuf::from(".local/share/chordline/audio"))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            audio_dir: Self::default_audio_dir(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `tracing` filter directive, e.g. "info" or "chord_decode=debug".
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
