use tracing::warn;

use crate::types::ChordSegment;

/// Collapse a decoded path into timed chord segments.
///
/// Each maximal run of one state becomes a segment spanning from its first
/// beat to the first beat of the next run. The final run ends at the last
/// entry of `times`. Runs shorter than `min_duration` are dropped outright;
/// neighbours are not stretched to cover them.
///
/// Only the common prefix of `path` and `times` is scanned.
pub fn build_segments<L: AsRef<str>>(
    path: &[usize],
    labels: &[L],
    times: &[f64],
    min_duration: f64,
) -> Vec<ChordSegment> {
    let len = path.len().min(times.len());
    if len == 0 {
        return Vec::new();
    }
    if path.len() != times.len() {
        warn!(
            path = path.len(),
            times = times.len(),
            "path and beat times differ in length, truncating"
        );
    }

    let mut segments = Vec::new();
    let mut emit = |state: usize, start: f64, end: f64| {
        let duration = end - start;
        if duration.is_nan() || duration < min_duration {
            return;
        }
        let Some(label) = labels.get(state) else {
            warn!(state, "decoded state has no label, skipping run");
            return;
        };
        segments.push(ChordSegment {
            chord: label.as_ref().to_string(),
            timestamp: start,
            duration,
        });
    };

    let mut start = 0;
    let mut current = path[0];
    for i in 1..len {
        if path[i] != current {
            emit(current, times[start], times[i]);
            start = i;
            current = path[i];
        }
    }
    emit(current, times[start], times[times.len() - 1]);

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels() -> Vec<String> {
        crate::templates::build_templates().0
    }

    fn seg(chord: &str, timestamp: f64, duration: f64) -> ChordSegment {
        ChordSegment {
            chord: chord.into(),
            timestamp,
            duration,
        }
    }

    #[test]
    fn two_runs_both_kept() {
        let segments = build_segments(&[0, 0, 5, 5], &labels(), &[0.0, 0.6, 1.2, 1.8], 0.5);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], seg("C", 0.0, 1.2));
        assert_eq!(segments[1].chord, "Dm");
        assert_eq!(segments[1].timestamp, 1.2);
        assert!((segments[1].duration - 0.6).abs() < 1e-12);
    }

    #[test]
    fn single_frame_tail_dropped() {
        let segments = build_segments(&[0, 0, 5], &labels(), &[0.0, 0.6, 1.2], 0.5);
        assert_eq!(segments, vec![seg("C", 0.0, 1.2)]);
    }

    #[test]
    fn short_middle_run_not_merged() {
        let times = [0.0, 1.0, 2.0, 2.25, 3.0, 4.0];
        let segments = build_segments(&[0, 0, 2, 4, 4, 4], &labels(), &times, 0.5);
        assert_eq!(
            segments,
            vec![seg("C", 0.0, 2.0), seg("D", 2.25, 1.75)]
        );
    }

    #[test]
    fn everything_too_short_is_empty() {
        let segments = build_segments(&[0, 1, 2], &labels(), &[0.0, 0.1, 0.2], 0.5);
        assert!(segments.is_empty());
    }

    #[test]
    fn nan_duration_never_emitted() {
        let segments = build_segments(&[0, 0, 2, 2], &labels(), &[0.0, 1.0, f64::NAN, 3.0], 0.5);
        assert_eq!(segments, vec![]);

        let segments = build_segments(&[0, 0, 2, 2], &labels(), &[0.0, 1.0, 2.0, f64::NAN], 0.5);
        assert_eq!(segments, vec![seg("C", 0.0, 2.0)]);
    }

    #[test]
    fn empty_inputs() {
        assert!(build_segments(&[], &labels(), &[0.0, 1.0], 0.5).is_empty());
        assert!(build_segments(&[0, 0], &labels(), &[], 0.5).is_empty());
    }

    #[test]
    fn longer_path_truncated_to_times() {
        let segments = build_segments(&[3, 3, 3, 7, 7], &labels(), &[0.0, 0.5, 1.0], 0.5);
        assert_eq!(segments, vec![seg("C#m", 0.0, 1.0)]);
    }

    #[test]
    fn segments_ordered_and_within_span() {
        let times: Vec<f64> = (0..20).map(|i| i as f64 * 0.4).collect();
        let path = [0, 0, 0, 1, 1, 2, 2, 2, 2, 0, 3, 3, 3, 3, 3, 1, 1, 1, 1, 1];
        let segments = build_segments(&path, &labels(), &times, 0.5);

        let total: f64 = segments.iter().map(|s| s.duration).sum();
        assert!(total <= times[19] - times[0] + 1e-9);
        for s in &segments {
            assert!(s.duration >= 0.5);
        }
        for pair in segments.windows(2) {
            assert!(pair[0].timestamp + pair[0].duration <= pair[1].timestamp + 1e-9);
        }
    }
}
