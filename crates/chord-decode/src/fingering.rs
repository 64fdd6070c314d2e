//! Static guitar chord diagrams used to annotate analysis results.
//!
//! Strings run low E to high E. A fret of `-1` means the string is muted,
//! `0` means open. Finger `0` means no finger on that string.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordChart {
    pub chord: String,
    pub frets: [i8; 6],
    pub fingers: [u8; 6],
}

struct ChartEntry {
    chord: &'static str,
    frets: [i8; 6],
    fingers: [u8; 6],
}

impl ChartEntry {
    fn to_chart(&self) -> ChordChart {
        ChordChart {
            chord: self.chord.to_string(),
            frets: self.frets,
            fingers: self.fingers,
        }
    }
}

const fn entry(chord: &'static str, frets: [i8; 6], fingers: [u8; 6]) -> ChartEntry {
    ChartEntry {
        chord,
        frets,
        fingers,
    }
}

static CHARTS: &[ChartEntry] = &[
    entry("A", [0, 0, 2, 2, 2, 0], [0, 0, 1, 2, 3, 0]),
    entry("A#", [1, 1, 3, 3, 3, 1], [1, 1, 2, 3, 4, 1]),
    entry("A#m", [1, 1, 3, 3, 2, 1], [1, 1, 3, 4, 2, 1]),
    entry("Am", [0, 0, 2, 2, 1, 0], [0, 0, 2, 3, 1, 0]),
    entry("B", [2, 2, 4, 4, 4, 2], [1, 1, 2, 3, 4, 1]),
    entry("Bb", [1, 1, 3, 3, 3, 1], [1, 1, 2, 3, 4, 1]),
    entry("Bm", [2, 2, 4, 4, 3, 2], [1, 1, 3, 4, 2, 1]),
    entry("C", [0, 3, 2, 0, 1, 0], [0, 3, 2, 0, 1, 0]),
    entry("C#", [-1, 4, 6, 6, 6, 4], [0, 1, 3, 4, 2, 1]),
    entry("C#m", [4, 4, 6, 6, 5, 4], [1, 1, 3, 4, 2, 1]),
    entry("Cm", [-1, 3, 5, 5, 4, 3], [0, 1, 3, 4, 2, 1]),
    entry("D", [-1, 0, 0, 2, 3, 2], [0, 0, 0, 1, 3, 2]),
    entry("D#", [-1, 6, 8, 8, 8, 6], [0, 1, 3, 4, 2, 1]),
    entry("D#m", [-1, 6, 8, 8, 7, 6], [0, 1, 3, 4, 2, 1]),
    entry("Dm", [-1, 0, 0, 2, 3, 1], [0, 0, 0, 2, 3, 1]),
    entry("E", [0, 2, 2, 1, 0, 0], [0, 2, 3, 1, 0, 0]),
    entry("Em", [0, 2, 2, 0, 0, 0], [0, 1, 2, 0, 0, 0]),
    entry("F", [1, 3, 3, 2, 1, 1], [1, 3, 4, 2, 1, 1]),
    entry("F#", [2, 4, 4, 3, 2, 2], [1, 3, 4, 2, 1, 1]),
    entry("Fm", [1, 3, 3, 1, 1, 1], [1, 3, 4, 1, 1, 1]),
    entry("F#m", [2, 4, 4, 2, 2, 2], [1, 3, 4, 1, 1, 1]),
    entry("G", [3, 2, 0, 0, 3, 3], [3, 1, 0, 0, 4, 4]),
    entry("G#", [4, 6, 6, 5, 4, 4], [1, 3, 4, 2, 1, 1]),
    entry("G#m", [4, 6, 6, 4, 4, 4], [1, 3, 4, 1, 1, 1]),
    entry("Gm", [3, 3, 5, 5, 3, 3], [1, 1, 3, 4, 1, 1]),
];

/// Diagram for a chord label, if the table has one.
pub fn lookup(chord: &str) -> Option<ChordChart> {
    CHARTS
        .iter()
        .find(|e| e.chord == chord)
        .map(ChartEntry::to_chart)
}

/// Diagrams for each distinct label, in order of first appearance.
///
/// Labels missing from the table are skipped, unless `fallback` names a chord
/// that is in the table, in which case its diagram stands in for them.
pub fn charts_for<L: AsRef<str>>(labels: &[L], fallback: Option<&str>) -> Vec<ChordChart> {
    let fallback = fallback.and_then(lookup);
    let mut seen: Vec<&str> = Vec::new();
    let mut charts = Vec::new();

    for label in labels {
        let label = label.as_ref();
        if seen.contains(&label) {
            continue;
        }
        seen.push(label);

        if let Some(chart) = lookup(label).or_else(|| fallback.clone()) {
            charts.push(chart);
        }
    }

    charts
}
