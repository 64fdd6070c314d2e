use tracing::debug;

use crate::decoder::decode;
use crate::key::estimate_key;
use crate::segments::build_segments;
use crate::similarity::score;
use crate::templates::TemplateBank;
use crate::types::{ChordSegment, Chroma, DecodeParams, KeyEstimate};
use crate::Result;

/// Trait for chord analysis backends.
///
/// `TemplateAnalyzer` is the triad-template decoder. Callers hold it as
/// `Arc<dyn ChordAnalyzer>` so tests can substitute canned results.
pub trait ChordAnalyzer: Send + Sync {
    fn extract_chords(
        &self,
        chroma: &[Chroma],
        beat_times: &[f64],
        params: &DecodeParams,
    ) -> Result<Vec<ChordSegment>>;

    fn analyze_key(&self, chords: &[ChordSegment]) -> KeyEstimate;
}

/// Template matching, Gaussian smoothing, switch-penalty decoding.
pub struct TemplateAnalyzer {
    bank: &'static TemplateBank,
}

impl TemplateAnalyzer {
    pub fn new() -> Self {
        Self {
            bank: TemplateBank::global(),
        }
    }
}

impl Default for TemplateAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChordAnalyzer for TemplateAnalyzer {
    fn extract_chords(
        &self,
        chroma: &[Chroma],
        beat_times: &[f64],
        params: &DecodeParams,
    ) -> Result<Vec<ChordSegment>> {
        let scores = score(chroma, &self.bank.profiles(), params.smoothing_sigma);
        let path = decode(&scores, params.switch_penalty)?;
        let labels: Vec<&str> = (0..self.bank.len())
            .filter_map(|i| self.bank.label(i))
            .collect();
        let segments = build_segments(&path, &labels, beat_times, params.min_segment_duration);

        debug!(
            beats = chroma.len(),
            segments = segments.len(),
            "extracted chord segments"
        );
        Ok(segments)
    }

    fn analyze_key(&self, chords: &[ChordSegment]) -> KeyEstimate {
        let labels: Vec<&str> = chords.iter().map(|c| c.chord.as_str()).collect();
        estimate_key(&labels)
    }
}
