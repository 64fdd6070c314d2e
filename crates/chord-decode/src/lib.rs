//! Chord timeline and key estimation from beat-synchronous chroma.
//!
//! The pipeline scores every beat against 24 major/minor triad templates,
//! smooths the scores along time, decodes the best label sequence under a
//! flat switch penalty, collapses it into timed segments, and votes on a key.
//!
//! ```
//! use chord_decode::{analyze_chords, DecodeParams};
//!
//! let c_major = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
//! let chroma = vec![c_major; 4];
//! let beats = [0.0, 0.5, 1.0, 1.5];
//!
//! let timeline = analyze_chords(&chroma, &beats, &DecodeParams::default()).unwrap();
//! assert_eq!(timeline.chords[0].chord, "C");
//! assert_eq!(timeline.key.display_name(), "C Major");
//! ```

pub mod analyzer;
pub mod decoder;
pub mod fingering;
pub mod key;
pub mod segments;
pub mod similarity;
pub mod source;
pub mod templates;
pub mod types;

pub use analyzer::{ChordAnalyzer, TemplateAnalyzer};
pub use fingering::ChordChart;
pub use similarity::ScoreMatrix;
pub use source::{AudioHandle, AudioSource, FeatureExtractor, LocalAudioSource, SidecarFeatureExtractor};
pub use templates::{build_templates, TemplateBank};
pub use types::{
    BeatFeatures, ChordQuality, ChordSegment, ChordTimeline, Chroma, DecodeParams, KeyEstimate,
    SongAnalysis,
};

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

/// Time signature reported for every song; meter is not analyzed.
pub const DEFAULT_SIGNATURE: &str = "4/4";

/// Errors from chord analysis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("feature matrix has no frames")]
    NoFrames,

    #[error("no beat timestamps supplied")]
    NoTimestamps,

    #[error("feature frame {frame} contains a non-finite value")]
    NonFiniteFeature { frame: usize },

    #[error("beat timestamp {beat} is not finite")]
    NonFiniteTimestamp { beat: usize },

    #[error("switch penalty must be finite and non-negative, got {0}")]
    InvalidPenalty(f64),

    #[error("score matrix is empty")]
    EmptyScores,

    #[error("audio source not found: {0}")]
    SourceNotFound(String),

    #[error("fetching {source_ref} failed: {message}")]
    Fetch { source_ref: String, message: String },

    #[error("feature extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },
}

impl Error {
    /// True for errors caused by malformed caller input rather than a collaborator.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::NoFrames
                | Error::NoTimestamps
                | Error::NonFiniteFeature { .. }
                | Error::NonFiniteTimestamp { .. }
                | Error::InvalidPenalty(_)
                | Error::EmptyScores
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn validate_input(chroma: &[Chroma], beat_times: &[f64]) -> Result<()> {
    if chroma.is_empty() {
        return Err(Error::NoFrames);
    }
    if beat_times.is_empty() {
        return Err(Error::NoTimestamps);
    }
    if let Some(frame) = chroma.iter().position(|c| c.iter().any(|v| !v.is_finite())) {
        return Err(Error::NonFiniteFeature { frame });
    }
    if let Some(beat) = beat_times.iter().position(|t| !t.is_finite()) {
        return Err(Error::NonFiniteTimestamp { beat });
    }
    if chroma.len() != beat_times.len() {
        warn!(
            frames = chroma.len(),
            beats = beat_times.len(),
            "chroma and beat times differ in length"
        );
    }
    Ok(())
}

/// Run the decoding pipeline with a specific analyzer.
pub fn analyze_with(
    analyzer: &dyn ChordAnalyzer,
    chroma: &[Chroma],
    beat_times: &[f64],
    params: &DecodeParams,
) -> Result<ChordTimeline> {
    validate_input(chroma, beat_times)?;

    let chords = analyzer.extract_chords(chroma, beat_times, params)?;
    let key = analyzer.analyze_key(&chords);

    Ok(ChordTimeline { chords, key })
}

/// Decode a chord timeline and key from beat-synchronous chroma.
///
/// An empty timeline (every run shorter than the minimum duration) is a
/// valid result and carries the default key.
pub fn analyze_chords(
    chroma: &[Chroma],
    beat_times: &[f64],
    params: &DecodeParams,
) -> Result<ChordTimeline> {
    analyze_with(&TemplateAnalyzer::new(), chroma, beat_times, params)
}

/// Tempo rounded half-to-even, clamped into `u32`.
fn round_bpm(tempo: f64) -> u32 {
    // `as` saturates: NaN and negatives land on 0
    tempo.round_ties_even() as u32
}

/// End-to-end analysis: fetch audio, extract features, decode chords,
/// attach chord diagrams.
///
/// Failures of the audio source and feature extractor are reported as their
/// own error variants, never as an empty analysis.
pub struct ChordAnalysisEngine {
    source: Arc<dyn AudioSource>,
    extractor: Arc<dyn FeatureExtractor>,
    analyzer: Arc<dyn ChordAnalyzer>,
    params: DecodeParams,
    chart_fallback: Option<String>,
}

impl ChordAnalysisEngine {
    /// Create with the default template analyzer and decode parameters.
    pub fn new(source: Arc<dyn AudioSource>, extractor: Arc<dyn FeatureExtractor>) -> Self {
        Self {
            source,
            extractor,
            analyzer: Arc::new(TemplateAnalyzer::new()),
            params: DecodeParams::default(),
            chart_fallback: None,
        }
    }

    /// Replace the analyzer (for testing or an alternative backend).
    pub fn with_analyzer(mut self, analyzer: Arc<dyn ChordAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_params(mut self, params: DecodeParams) -> Self {
        self.params = params;
        self
    }

    /// Chart shown for chords missing from the fingering table.
    pub fn with_chart_fallback(mut self, chord: Option<String>) -> Self {
        self.chart_fallback = chord;
        self
    }

    pub fn params(&self) -> &DecodeParams {
        &self.params
    }

    /// Analyze a song identified by `source_ref`.
    pub fn analyze(&self, source_ref: &str) -> Result<SongAnalysis> {
        let audio = self.source.fetch_audio(source_ref)?;
        info!(source = source_ref, path = %audio.path.display(), "audio fetched");

        let features = self.extractor.extract_features(&audio)?;
        self.analyze_features(&features)
    }

    /// Analyze features that were extracted elsewhere.
    pub fn analyze_features(&self, features: &BeatFeatures) -> Result<SongAnalysis> {
        let timeline = analyze_with(
            self.analyzer.as_ref(),
            &features.chroma,
            &features.beat_times,
            &self.params,
        )?;

        let labels: Vec<&str> = timeline.chords.iter().map(|c| c.chord.as_str()).collect();
        let chord_charts = fingering::charts_for(&labels, self.chart_fallback.as_deref());

        info!(
            beats = features.chroma.len(),
            segments = timeline.chords.len(),
            key = %timeline.key.root,
            "chord analysis complete"
        );

        Ok(SongAnalysis {
            bpm: round_bpm(features.tempo),
            signature: DEFAULT_SIGNATURE.to_string(),
            key: timeline.key.display_name(),
            chords: timeline.chords,
            chord_charts,
        })
    }
}
