//! End-to-end behaviour of the decoding pipeline and the analysis engine.

use std::sync::{Arc, Mutex};

use chord_decode::decoder::decode;
use chord_decode::segments::build_segments;
use chord_decode::{
    analyze_chords, build_templates, AudioHandle, AudioSource, BeatFeatures, ChordAnalysisEngine,
    ChordAnalyzer, ChordSegment, Chroma, DecodeParams, Error, FeatureExtractor, KeyEstimate,
    LocalAudioSource, ScoreMatrix, SidecarFeatureExtractor,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn triad(pcs: [usize; 3]) -> Chroma {
    let mut c = [0.02; 12];
    for pc in pcs {
        c[pc] = 1.0;
    }
    c
}

fn beats(n: usize, spacing: f64) -> Vec<f64> {
    (0..n).map(|i| i as f64 * spacing).collect()
}

/// Scores with a gap of at least 1.0 in favour of `winners[t]` at frame t.
fn scores_favoring(winners: &[usize]) -> ScoreMatrix {
    let rows: Vec<Vec<f64>> = winners
        .iter()
        .map(|&w| {
            let mut row = vec![0.1; 24];
            row[w] = 1.2;
            row
        })
        .collect();
    ScoreMatrix::from_rows(&rows)
}

#[test]
fn two_segment_scenario() {
    let (labels, _) = build_templates();
    let path = decode(&scores_favoring(&[0, 0, 5, 5]), 0.15).unwrap();
    assert_eq!(path, vec![0, 0, 5, 5]);

    let segments = build_segments(&path, &labels, &[0.0, 0.6, 1.2, 1.8], 0.5);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].chord, labels[0]);
    assert_eq!((segments[0].timestamp, segments[0].duration), (0.0, 1.2));
    assert_eq!(segments[1].chord, labels[5]);
    assert_eq!(segments[1].timestamp, 1.2);
    assert!((segments[1].duration - 0.6).abs() < 1e-12);
}

#[test]
fn filtered_tail_scenario() {
    let (labels, _) = build_templates();
    let path = decode(&scores_favoring(&[0, 0, 5]), 0.15).unwrap();
    assert_eq!(path, vec![0, 0, 5]);

    let segments = build_segments(&path, &labels, &[0.0, 0.6, 1.2], 0.5);
    assert_eq!(
        segments,
        vec![ChordSegment {
            chord: labels[0].clone(),
            timestamp: 0.0,
            duration: 1.2,
        }]
    );
}

#[test]
fn progression_with_passing_tone_decodes_cleanly() {
    // I - V - vi - IV in C, one beat of G's chroma is replaced by a stray F#
    let mut chroma: Vec<Chroma> = Vec::new();
    for pcs in [[0, 4, 7], [7, 11, 2], [9, 0, 4], [5, 9, 0]] {
        chroma.extend(std::iter::repeat(triad(pcs)).take(6));
    }
    chroma[8] = triad([6, 11, 2]);

    let times = beats(chroma.len(), 0.5);
    let timeline = analyze_chords(&chroma, &times, &DecodeParams::default()).unwrap();

    let names: Vec<_> = timeline.chords.iter().map(|c| c.chord.as_str()).collect();
    assert_eq!(names, vec!["C", "G", "Am", "F"]);
    assert_eq!(timeline.key.root, "C");
}

#[test]
fn segments_respect_minimum_and_ordering() {
    let mut chroma: Vec<Chroma> = Vec::new();
    for (i, pcs) in [[0, 4, 7], [2, 5, 9], [7, 11, 2], [4, 7, 11], [0, 4, 7]]
        .iter()
        .enumerate()
    {
        chroma.extend(std::iter::repeat(triad(*pcs)).take(2 + i));
    }
    let times = beats(chroma.len(), 0.3);
    let params = DecodeParams {
        min_segment_duration: 0.7,
        ..DecodeParams::default()
    };
    let timeline = analyze_chords(&chroma, &times, &params).unwrap();

    let span = times[times.len() - 1] - times[0];
    let total: f64 = timeline.chords.iter().map(|c| c.duration).sum();
    assert!(total <= span + 1e-9);
    for chord in &timeline.chords {
        assert!(chord.duration >= 0.7, "{:?}", chord);
    }
    for pair in timeline.chords.windows(2) {
        assert!(pair[0].timestamp + pair[0].duration <= pair[1].timestamp + 1e-9);
    }
}

#[test]
fn repeated_analysis_is_identical() {
    let chroma: Vec<Chroma> = (0..32)
        .map(|i| {
            let mut c = [0.0; 12];
            for (pc, v) in c.iter_mut().enumerate() {
                *v = (((i * 5 + pc * 7) % 13) as f64) / 13.0;
            }
            c
        })
        .collect();
    let times = beats(32, 0.45);
    let params = DecodeParams::default();

    let first = analyze_chords(&chroma, &times, &params).unwrap();
    let second = analyze_chords(&chroma, &times, &params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn all_short_runs_give_empty_result_and_default_key() {
    let chroma = vec![triad([7, 11, 2]), triad([7, 11, 2])];
    let timeline = analyze_chords(&chroma, &[0.0, 0.2], &DecodeParams::default()).unwrap();
    assert!(timeline.chords.is_empty());
    assert_eq!(timeline.key.root, "C");
    assert_eq!(timeline.key.display_name(), "C Major");
}

struct FixedSource(AudioHandle);

impl AudioSource for FixedSource {
    fn fetch_audio(&self, _source_ref: &str) -> chord_decode::Result<AudioHandle> {
        Ok(self.0.clone())
    }
}

struct FailingSource;

impl AudioSource for FailingSource {
    fn fetch_audio(&self, source_ref: &str) -> chord_decode::Result<AudioHandle> {
        Err(Error::Fetch {
            source_ref: source_ref.to_string(),
            message: "unreachable host".into(),
        })
    }
}

struct CannedExtractor(BeatFeatures);

impl FeatureExtractor for CannedExtractor {
    fn extract_features(&self, _audio: &AudioHandle) -> chord_decode::Result<BeatFeatures> {
        Ok(self.0.clone())
    }
}

/// Records what it was asked to decode and returns a fixed timeline.
#[derive(Default)]
struct RecordingAnalyzer {
    calls: Mutex<Vec<usize>>,
}

impl ChordAnalyzer for RecordingAnalyzer {
    fn extract_chords(
        &self,
        chroma: &[Chroma],
        _beat_times: &[f64],
        _params: &DecodeParams,
    ) -> chord_decode::Result<Vec<ChordSegment>> {
        self.calls.lock().unwrap().push(chroma.len());
        Ok(vec![
            ChordSegment {
                chord: "Gm".into(),
                timestamp: 0.0,
                duration: 2.0,
            },
            ChordSegment {
                chord: "Cmaj7".into(),
                timestamp: 2.0,
                duration: 2.0,
            },
        ])
    }

    fn analyze_key(&self, _chords: &[ChordSegment]) -> KeyEstimate {
        KeyEstimate {
            root: "G".into(),
            root_pitch_class: 7,
            support: 1.0,
        }
    }
}

fn c_then_g() -> BeatFeatures {
    let mut chroma = vec![triad([0, 4, 7]); 4];
    chroma.extend(vec![triad([7, 11, 2]); 4]);
    BeatFeatures {
        beat_times: beats(8, 0.5),
        chroma,
        tempo: 120.5,
    }
}

#[test]
fn engine_builds_full_song_analysis() {
    let engine = ChordAnalysisEngine::new(
        Arc::new(FixedSource(AudioHandle {
            path: "/tmp/song.mp3".into(),
        })),
        Arc::new(CannedExtractor(c_then_g())),
    );

    let analysis = engine.analyze("dQw4w9WgXcQ").unwrap();
    assert_eq!(analysis.bpm, 120);
    assert_eq!(analysis.signature, "4/4");
    assert_eq!(analysis.key, "C Major");

    let names: Vec<_> = analysis.chords.iter().map(|c| c.chord.as_str()).collect();
    assert_eq!(names, vec!["C", "G"]);
    let charts: Vec<_> = analysis.chord_charts.iter().map(|c| c.chord.as_str()).collect();
    assert_eq!(charts, vec!["C", "G"]);

    let json = serde_json::to_value(&analysis).unwrap();
    assert!(json.get("chordCharts").is_some());
    assert_eq!(json["chords"][0]["chord"], "C");
}

#[test]
fn engine_surfaces_fetch_failure() {
    let engine = ChordAnalysisEngine::new(
        Arc::new(FailingSource),
        Arc::new(CannedExtractor(c_then_g())),
    );
    let err = engine.analyze("https://example.invalid/watch").unwrap_err();
    assert!(matches!(err, Error::Fetch { .. }));
    assert!(!err.is_invalid_input());
}

#[test]
fn engine_reports_invalid_features() {
    let engine = ChordAnalysisEngine::new(
        Arc::new(FixedSource(AudioHandle {
            path: "/tmp/song.mp3".into(),
        })),
        Arc::new(CannedExtractor(BeatFeatures {
            chroma: vec![],
            beat_times: vec![],
            tempo: 90.0,
        })),
    );
    let err = engine.analyze("anything").unwrap_err();
    assert!(matches!(err, Error::NoFrames));
}

#[test]
fn engine_uses_custom_analyzer_and_chart_fallback() {
    let analyzer = Arc::new(RecordingAnalyzer::default());
    let engine = ChordAnalysisEngine::new(
        Arc::new(FixedSource(AudioHandle {
            path: "/tmp/song.mp3".into(),
        })),
        Arc::new(CannedExtractor(c_then_g())),
    )
    .with_analyzer(analyzer.clone())
    .with_chart_fallback(Some("C".into()));

    let analysis = engine.analyze("x").unwrap();
    assert_eq!(*analyzer.calls.lock().unwrap(), vec![8]);
    assert_eq!(analysis.key, "G Major");

    let charts: Vec<_> = analysis.chord_charts.iter().map(|c| c.chord.as_str()).collect();
    assert_eq!(charts, vec!["Gm", "C"]);
}

#[test]
fn engine_with_local_adapters() {
    let dir = TempDir::new().unwrap();
    let audio = dir.path().join("track.mp3");
    std::fs::write(&audio, b"not really audio").unwrap();
    std::fs::write(
        SidecarFeatureExtractor::sidecar_path(&audio),
        serde_json::to_string(&c_then_g()).unwrap(),
    )
    .unwrap();

    let engine = ChordAnalysisEngine::new(
        Arc::new(LocalAudioSource::new(dir.path())),
        Arc::new(SidecarFeatureExtractor),
    );

    let analysis = engine.analyze("track.mp3").unwrap();
    assert_eq!(analysis.chords.len(), 2);

    let err = engine.analyze("missing.mp3").unwrap_err();
    assert!(matches!(err, Error::SourceNotFound(_)));
}
