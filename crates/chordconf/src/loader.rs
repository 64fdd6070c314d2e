//! Config file discovery, loading, and environment variable overlay.

use crate::{ChordConfig, ConfigError};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli). Only returns
/// files that exist.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    // System config
    let system = PathBuf::from("/etc/chordline/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("chordline/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // CLI override takes precedence over local
    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("chordline.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load a TOML file on top of `base`.
pub fn load_from_file(base: ChordConfig, path: &Path) -> Result<ChordConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(base, &contents, path)
}

/// Read a number that may be written as either a TOML float or integer.
fn number(
    table: &toml::Table,
    key: &str,
    path: &Path,
) -> Result<Option<f64>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::Float(v)) => Ok(Some(*v)),
        Some(toml::Value::Integer(v)) => Ok(Some(*v as f64)),
        Some(other) => Err(ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("{} must be a number, found {}", key, other.type_str()),
        }),
    }
}

/// Apply the keys present in a TOML document to `config`.
pub(crate) fn parse_toml(
    mut config: ChordConfig,
    contents: &str,
    path: &Path,
) -> Result<ChordConfig, ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(decode) = table.get("decode").and_then(|v| v.as_table()) {
        if let Some(v) = number(decode, "switch_penalty", path)? {
            config.decode.switch_penalty = v;
        }
        if let Some(v) = number(decode, "min_segment_duration", path)? {
            config.decode.min_segment_duration = v;
        }
        if let Some(v) = number(decode, "smoothing_sigma", path)? {
            config.decode.smoothing_sigma = v;
        }
    }

    if let Some(paths) = table.get("paths").and_then(|v| v.as_table()) {
        if let Some(v) = paths.get("audio_dir").and_then(|v| v.as_str()) {
            config.paths.audio_dir = expand_path(v);
        }
    }

    if let Some(charts) = table.get("charts").and_then(|v| v.as_table()) {
        if let Some(v) = charts.get("fallback_chord").and_then(|v| v.as_str()) {
            config.charts.fallback_chord = non_empty(v);
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    Ok(config)
}

fn non_empty(v: &str) -> Option<String> {
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}

/// Apply environment variable overrides to config.
///
/// Unparseable numeric values are ignored.
pub fn apply_env_overrides(config: &mut ChordConfig, sources: &mut ConfigSources) {
    let mut env_number = |name: &str, target: &mut f64| {
        if let Some(v) = env::var(name).ok().and_then(|v| v.trim().parse().ok()) {
            *target = v;
            sources.env_overrides.push(name.to_string());
        }
    };

    env_number("CHORDLINE_SWITCH_PENALTY", &mut config.decode.switch_penalty);
    env_number(
        "CHORDLINE_MIN_SEGMENT_DURATION",
        &mut config.decode.min_segment_duration,
    );
    env_number("CHORDLINE_SMOOTHING_SIGMA", &mut config.decode.smoothing_sigma);

    if let Ok(v) = env::var("CHORDLINE_AUDIO_DIR") {
        config.paths.audio_dir = expand_path(&v);
        sources.env_overrides.push("CHORDLINE_AUDIO_DIR".to_string());
    }
    if let Ok(v) = env::var("CHORDLINE_FALLBACK_CHORD") {
        config.charts.fallback_chord = non_empty(&v);
        sources.env_overrides.push("CHORDLINE_FALLBACK_CHORD".to_string());
    }

    if let Ok(v) = env::var("CHORDLINE_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("CHORDLINE_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Ok(v) = env::var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
