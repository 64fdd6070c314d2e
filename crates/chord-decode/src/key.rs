use crate::templates::{note_name, pitch_class};
use crate::types::KeyEstimate;

/// Root reported when there is nothing to vote on.
const DEFAULT_ROOT: u8 = 0;

/// Root of a chord label: the label with its minor marker removed.
fn chord_root(label: &str) -> &str {
    label.strip_suffix('m').unwrap_or(label)
}

/// Estimate the key as the most common chord root.
///
/// Sharp and flat spellings of the same root count together. Ties go to the
/// lowest pitch class. Labels whose root is not a note name are ignored; if
/// nothing is counted the default root C is returned.
pub fn estimate_key<L: AsRef<str>>(labels: &[L]) -> KeyEstimate {
    let mut counts = [0usize; 12];
    for label in labels {
        if let Some(pc) = pitch_class(chord_root(label.as_ref())) {
            counts[pc as usize] += 1;
        }
    }

    let total: usize = counts.iter().sum();
    if total == 0 {
        return KeyEstimate {
            root: note_name(DEFAULT_ROOT).to_string(),
            root_pitch_class: DEFAULT_ROOT,
            support: 0.0,
        };
    }

    let mut best_pc = 0;
    for pc in 1..12 {
        if counts[pc] > counts[best_pc] {
            best_pc = pc;
        }
    }

    KeyEstimate {
        root: note_name(best_pc as u8).to_string(),
        root_pitch_class: best_pc as u8,
        support: counts[best_pc] as f64 / total as f64,
    }
}
