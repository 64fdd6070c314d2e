//! CLI command implementations
//!
//! Each command returns the text to print so the binary stays a thin shell.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chord_decode::source::read_features;
use chord_decode::{
    ChordAnalysisEngine, DecodeParams, LocalAudioSource, SidecarFeatureExtractor, SongAnalysis,
    TemplateBank,
};
use chordconf::{ChordConfig, ConfigSources};
use tracing::debug;

/// Decode settings given on the command line, applied over the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub switch_penalty: Option<f64>,
    pub min_duration: Option<f64>,
}

fn check_non_negative(flag: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        bail!("{} must be a finite, non-negative number, got {}", flag, value);
    }
    Ok(value)
}

/// Effective decode parameters: config values, then command-line overrides.
pub fn decode_params(config: &ChordConfig, overrides: &Overrides) -> Result<DecodeParams> {
    let mut params = DecodeParams {
        switch_penalty: config.decode.switch_penalty,
        min_segment_duration: config.decode.min_segment_duration,
        smoothing_sigma: config.decode.smoothing_sigma,
    };

    if let Some(v) = overrides.switch_penalty {
        params.switch_penalty = check_non_negative("--switch-penalty", v)?;
    }
    if let Some(v) = overrides.min_duration {
        params.min_segment_duration = check_non_negative("--min-duration", v)?;
    }

    debug!(?params, "decode parameters");
    Ok(params)
}

fn engine(config: &ChordConfig, overrides: &Overrides) -> Result<ChordAnalysisEngine> {
    Ok(ChordAnalysisEngine::new(
        Arc::new(LocalAudioSource::new(config.paths.audio_dir.clone())),
        Arc::new(SidecarFeatureExtractor),
    )
    .with_params(decode_params(config, overrides)?)
    .with_chart_fallback(config.charts.fallback_chord.clone()))
}

fn render(analysis: &SongAnalysis, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(analysis)
    } else {
        serde_json::to_string(analysis)
    };
    json.context("Failed to serialize analysis")
}

/// Decode a beat-feature JSON file.
pub fn decode_file(
    path: &Path,
    config: &ChordConfig,
    overrides: &Overrides,
    pretty: bool,
) -> Result<String> {
    let features = read_features(path)?;
    let analysis = engine(config, overrides)?
        .analyze_features(&features)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    render(&analysis, pretty)
}

/// Fetch, extract and decode a song by source reference.
pub fn analyze_source(
    source_ref: &str,
    config: &ChordConfig,
    overrides: &Overrides,
    pretty: bool,
) -> Result<String> {
    let analysis = engine(config, overrides)?
        .analyze(source_ref)
        .with_context(|| format!("Failed to analyze '{}'", source_ref))?;
    render(&analysis, pretty)
}

/// One line per template: label followed by its profile.
pub fn templates() -> String {
    let mut output = String::new();
    for template in TemplateBank::global().templates() {
        let profile: Vec<String> = template.profile.iter().map(|p| format!("{:.3}", p)).collect();
        output.push_str(&format!("{:<4} {}\n", template.label, profile.join(" ")));
    }
    output
}

/// Effective configuration as TOML, preceded by comments naming the files
/// and environment variables it came from.
pub fn show_config(config: &ChordConfig, sources: &ConfigSources) -> String {
    let mut output = String::new();
    if sources.files.is_empty() {
        output.push_str("# no config files found, using defaults\n");
    }
    for path in &sources.files {
        output.push_str(&format!("# file: {}\n", path.display()));
    }
    for var in &sources.env_overrides {
        output.push_str(&format!("# env: {}\n", var));
    }
    output.push('\n');
    output.push_str(&config.to_toml());
    output
}
