use tracing::debug;

use crate::similarity::ScoreMatrix;
use crate::{Error, Result};

/// Index and value of the maximum; the lowest index wins ties.
fn argmax(values: &[f64]) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best {
            best = v;
            best_idx = i;
        }
    }
    (best_idx, best)
}

/// Find the highest-scoring state sequence when staying is free and any
/// switch costs a flat `switch_penalty`.
///
/// Because the switch cost does not depend on which states are involved, the
/// best predecessor for a switch is always the global best of the previous
/// frame, so each step is O(N) instead of O(N²):
///
/// `dp[t][j] = scores[t][j] + max(dp[t-1][j], max_k dp[t-1][k] - penalty)`
///
/// Staying wins ties against switching. All argmax ties go to the lowest index.
pub fn decode(scores: &ScoreMatrix, switch_penalty: f64) -> Result<Vec<usize>> {
    if scores.is_empty() {
        return Err(Error::EmptyScores);
    }
    if !switch_penalty.is_finite() || switch_penalty < 0.0 {
        return Err(Error::InvalidPenalty(switch_penalty));
    }

    let frames = scores.frames();
    let states = scores.states();
    debug!(frames, states, switch_penalty, "decoding chord path");

    let mut previous = scores.row(0).to_vec();
    let mut current = vec![0.0; states];
    let mut backpointers = vec![0usize; frames * states];

    for frame in 1..frames {
        let (best_state, best_prev) = argmax(&previous);
        let switch_score = best_prev - switch_penalty;
        let row = scores.row(frame);
        let bp = &mut backpointers[frame * states..(frame + 1) * states];

        for state in 0..states {
            if previous[state] >= switch_score {
                current[state] = row[state] + previous[state];
                bp[state] = state;
            } else {
                current[state] = row[state] + switch_score;
                bp[state] = best_state;
            }
        }

        std::mem::swap(&mut previous, &mut current);
    }

    let mut path = vec![0usize; frames];
    path[frames - 1] = argmax(&previous).0;
    for frame in (1..frames).rev() {
        path[frame - 1] = backpointers[frame * states + path[frame]];
    }

    Ok(path)
}
