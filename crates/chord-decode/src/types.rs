use serde::{Deserialize, Serialize};

use crate::fingering::ChordChart;

/// Number of pitch classes in a chroma vector (C, C#, ..., B).
pub const PITCH_CLASSES: usize = 12;

/// One beat-synchronous chroma vector.
pub type Chroma = [f64; PITCH_CLASSES];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
}

impl ChordQuality {
    /// Suffix for chord symbol display
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
        }
    }

    /// Triad intervals above the root, in semitones.
    pub fn intervals(&self) -> [usize; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
        }
    }
}

/// Decoding knobs. Defaults match the values the service has always shipped with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodeParams {
    /// Flat cost paid whenever the decoded chord changes between beats.
    pub switch_penalty: f64,
    /// Runs shorter than this (seconds) are dropped from the timeline.
    pub min_segment_duration: f64,
    /// Standard deviation, in beats, of the temporal Gaussian smoothing.
    pub smoothing_sigma: f64,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            switch_penalty: 0.15,
            min_segment_duration: 0.5,
            smoothing_sigma: 1.0,
        }
    }
}

/// Output of the feature-extraction collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatFeatures {
    /// One chroma vector per detected beat.
    pub chroma: Vec<Chroma>,
    /// Beat onset times in seconds, parallel to `chroma`.
    pub beat_times: Vec<f64>,
    /// Tempo estimate in BPM. Not used by the decoder.
    pub tempo: f64,
}

/// A contiguous run of one decoded chord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordSegment {
    pub chord: String,
    /// Segment start, seconds
    pub timestamp: f64,
    /// Seconds; never below the configured minimum
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEstimate {
    /// Root note name: "C", "F#", ...
    pub root: String,
    /// Pitch class 0–11 (C=0, C#=1, ...)
    pub root_pitch_class: u8,
    /// Fraction of counted chords rooted on `root`; 0.0 for the default.
    pub support: f64,
}

impl KeyEstimate {
    /// Human-facing key name. Always reported as major.
    pub fn display_name(&self) -> String {
        format!("{} Major", self.root)
    }
}

/// Result of the core decoding pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordTimeline {
    pub chords: Vec<ChordSegment>,
    pub key: KeyEstimate,
}

/// Complete analysis of one song, as handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAnalysis {
    pub bpm: u32,
    pub signature: String,
    pub key: String,
    pub chords: Vec<ChordSegment>,
    pub chord_charts: Vec<ChordChart>,
}
