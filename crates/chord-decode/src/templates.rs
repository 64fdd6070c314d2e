use std::sync::OnceLock;

use crate::types::{Chroma, ChordQuality, PITCH_CLASSES};

/// Canonical pitch-class order. Template labels use these spellings.
pub const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Qualities emitted per root, in label order.
const QUALITIES: [ChordQuality; 2] = [ChordQuality::Major, ChordQuality::Minor];

/// A reference pitch-class profile for one chord.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordTemplate {
    pub label: String,
    pub root_pitch_class: u8,
    pub quality: ChordQuality,
    /// Triad indicator, L1-normalized to sum to 1.
    pub profile: Chroma,
}

impl ChordTemplate {
    fn triad(root: u8, quality: ChordQuality) -> Self {
        let mut profile = [0.0_f64; PITCH_CLASSES];
        for interval in quality.intervals() {
            profile[(root as usize + interval) % PITCH_CLASSES] = 1.0;
        }

        let total: f64 = profile.iter().sum();
        for p in &mut profile {
            *p /= total;
        }

        Self {
            label: format!("{}{}", note_name(root), quality.suffix()),
            root_pitch_class: root,
            quality,
            profile,
        }
    }
}

/// The 24 major/minor triad templates, interleaved per root: C, Cm, C#, C#m, ...
///
/// Column `i` of any score matrix built from this bank corresponds to
/// `templates()[i]`.
#[derive(Debug, Clone)]
pub struct TemplateBank {
    templates: Vec<ChordTemplate>,
}

impl TemplateBank {
    pub fn new() -> Self {
        let templates = (0..PITCH_CLASSES as u8)
            .flat_map(|root| QUALITIES.iter().map(move |&q| ChordTemplate::triad(root, q)))
            .collect();
        Self { templates }
    }

    /// Process-wide bank, built on first use.
    pub fn global() -> &'static TemplateBank {
        static BANK: OnceLock<TemplateBank> = OnceLock::new();
        BANK.get_or_init(TemplateBank::new)
    }

    pub fn templates(&self) -> &[ChordTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.templates.get(index).map(|t| t.label.as_str())
    }

    pub fn labels(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.label.clone()).collect()
    }

    pub fn profiles(&self) -> Vec<Chroma> {
        self.templates.iter().map(|t| t.profile).collect()
    }
}

impl Default for TemplateBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Labels and profiles of the template bank, in matching order.
pub fn build_templates() -> (Vec<String>, Vec<Chroma>) {
    let bank = TemplateBank::global();
    (bank.labels(), bank.profiles())
}

pub fn note_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES_SHARP[(pitch_class % 12) as usize]
}

/// Parse a root note name ("C", "F#", "Bb") into its pitch class.
pub fn pitch_class(name: &str) -> Option<u8> {
    NOTE_NAMES_SHARP
        .iter()
        .position(|&n| n == name)
        .or_else(|| NOTE_NAMES_FLAT.iter().position(|&n| n == name))
        .map(|idx| idx as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn twenty_four_interleaved_labels() {
        let (labels, profiles) = build_templates();
        assert_eq!(labels.len(), 24);
        assert_eq!(profiles.len(), 24);
        assert_eq!(&labels[..6], &["C", "Cm", "C#", "C#m", "D", "Dm"]);
        assert_eq!(labels[22], "B");
        assert_eq!(labels[23], "Bm");
    }

    #[test]
    fn label_by_state_index() {
        let bank = TemplateBank::global();
        assert_eq!(bank.label(0), Some("C"));
        assert_eq!(bank.label(3), Some("C#m"));
        assert_eq!(bank.label(23), Some("Bm"));
        assert_eq!(bank.label(24), None);
    }

    #[test]
    fn rows_sum_to_one() {
        for template in TemplateBank::global().templates() {
            let sum: f64 = template.profile.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "{} sums to {}", template.label, sum);
        }
    }

    #[test]
    fn c_major_and_a_minor_profiles() {
        let bank = TemplateBank::global();
        let third = 1.0 / 3.0;

        let c = &bank.templates()[0];
        assert_eq!(c.quality, ChordQuality::Major);
        let expected_c = [third, 0.0, 0.0, 0.0, third, 0.0, 0.0, third, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(c.profile, expected_c);

        // A minor: A C E
        let am = &bank.templates()[19];
        assert_eq!(am.label, "Am");
        assert_eq!(am.root_pitch_class, 9);
        let active: Vec<usize> = (0..12).filter(|&i| am.profile[i] > 0.0).collect();
        assert_eq!(active, vec![0, 4, 9]);
    }

    #[test]
    fn deterministic_across_builds() {
        let a = TemplateBank::new();
        let b = TemplateBank::new();
        assert_eq!(a.templates(), b.templates());
        assert_eq!(a.labels(), build_templates().0);
    }

    #[test]
    fn wrapping_roots() {
        // B major: B D# F#
        let b = &TemplateBank::global().templates()[22];
        let active: Vec<usize> = (0..12).filter(|&i| b.profile[i] > 0.0).collect();
        assert_eq!(active, vec![3, 6, 11]);
    }

    #[test]
    fn pitch_class_accepts_both_spellings() {
        assert_eq!(pitch_class("C"), Some(0));
        assert_eq!(pitch_class("F#"), Some(6));
        assert_eq!(pitch_class("Gb"), Some(6));
        assert_eq!(pitch_class("Bb"), Some(10));
        assert_eq!(pitch_class("H"), None);
        assert_eq!(note_name(13), "C#");
    }
}
