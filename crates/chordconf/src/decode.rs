//! Decoder tuning and result presentation.

use serde::{Deserialize, Serialize};

/// Decoder parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Flat cost of changing chord between beats.
    /// Default: 0.15
    #[serde(default = "DecodeConfig::default_switch_penalty")]
    pub switch_penalty: f64,

    /// Shortest segment kept in the timeline, seconds.
    /// Default: 0.5
    #[serde(default = "DecodeConfig::default_min_segment_duration")]
    pub min_segment_duration: f64,

    /// Temporal smoothing width in beats; 0 disables smoothing.
    /// Default: 1.0
    #[serde(default = "DecodeConfig::default_smoothing_sigma")]
    pub smoothing_sigma: f64,
}

impl DecodeConfig {
    fn default_switch_penalty() -> f64 {
        0.15
    }

    fn default_min_segment_duration() -> f64 {
        0.5
    }

    fn default_smoothing_sigma() -> f64 {
        1.0
    }
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            switch_penalty: Self::default_switch_penalty(),
            min_segment_duration: Self::default_min_segment_duration(),
            smoothing_sigma: Self::default_smoothing_sigma(),
        }
    }
}

/// Chord diagram options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Chord whose diagram stands in for chords missing from the table.
    /// Default: none (missing chords get no diagram)
    #[serde(default)]
    pub fallback_chord: Option<String>,
}
