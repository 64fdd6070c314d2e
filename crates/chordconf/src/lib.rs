//! Configuration loading for chordline.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/chordline/config.toml` (system)
//! 2. `~/.config/chordline/config.toml` (user)
//! 3. `./chordline.toml` (local override), or the path passed on the command line
//! 4. Environment variables (`CHORDLINE_*`)
//!
//! Each file only overrides the keys it sets.
//!
//! # Example Config
//!
//! ```toml
//! [decode]
//! switch_penalty = 0.15
//! min_segment_duration = 0.5
//! smoothing_sigma = 1.0
//!
//! [paths]
//! audio_dir = "~/music/stems"
//!
//! [charts]
//! fallback_chord = "C"
//!
//! [telemetry]
//! log_level = "info"
//! ```

pub mod decode;
pub mod infra;
pub mod loader;

pub use decode::{ChartsConfig, DecodeConfig};
pub use infra::{PathsConfig, TelemetryConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Complete chordline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChordConfig {
    #[serde(default)]
    pub decode: DecodeConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub charts: ChartsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ChordConfig {
    /// Load configuration and report which files and env vars contributed.
    ///
    /// `config_path` replaces the local `./chordline.toml` override. System
    /// and user configs still load first.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = ChordConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            config = loader::load_from_file(config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);
        config.validate()?;

        Ok((config, sources))
    }

    /// Reject decode parameters the decoder cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = |field: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    message: format!("expected a finite, non-negative number, got {}", value),
                })
            }
        };

        non_negative("decode.switch_penalty", self.decode.switch_penalty)?;
        non_negative("decode.min_segment_duration", self.decode.min_segment_duration)?;
        non_negative("decode.smoothing_sigma", self.decode.smoothing_sigma)?;
        Ok(())
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        // Build TOML manually for nicer formatting
        let mut output = String::new();

        output.push_str("# chordline configuration\n\n");

        output.push_str("[decode]\n");
        output.push_str(&format!("switch_penalty = {:?}\n", self.decode.switch_penalty));
        output.push_str(&format!(
            "min_segment_duration = {:?}\n",
            self.decode.min_segment_duration
        ));
        output.push_str(&format!("smoothing_sigma = {:?}\n", self.decode.smoothing_sigma));

        output.push_str("\n[paths]\n");
        output.push_str(&format!(
            "audio_dir = \"{}\"\n",
            self.paths.audio_dir.display()
        ));

        output.push_str("\n[charts]\n");
        output.push_str(&format!(
            "fallback_chord = \"{}\"\n",
            self.charts.fallback_chord.as_deref().unwrap_or("")
        ));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output
    }
}
