use crate::types::{Chroma, PITCH_CLASSES};

/// Guards the L2 norm against all-silent frames.
const NORM_EPSILON: f64 = 1e-9;

/// Gaussian kernel extends this many standard deviations each side.
const KERNEL_TRUNCATE: f64 = 4.0;

/// Kernel radius cap, in reflection periods (`2 * frames`).
const MAX_RADIUS_PERIODS: i64 = 4;

/// Dense row-major frames × states matrix of scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    data: Vec<f64>,
    frames: usize,
    states: usize,
}

impl ScoreMatrix {
    pub fn zeros(frames: usize, states: usize) -> Self {
        Self {
            data: vec![0.0; frames * states],
            frames,
            states,
        }
    }

    /// Build from explicit rows. Rows shorter than the first are zero-padded,
    /// longer ones truncated.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Self {
        let states = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut matrix = Self::zeros(rows.len(), states);
        for (t, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let n = row.len().min(states);
            matrix.row_mut(t)[..n].copy_from_slice(&row[..n]);
        }
        matrix
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn states(&self) -> usize {
        self.states
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0 || self.states == 0
    }

    pub fn get(&self, frame: usize, state: usize) -> f64 {
        self.data[frame * self.states + state]
    }

    pub fn row(&self, frame: usize) -> &[f64] {
        &self.data[frame * self.states..(frame + 1) * self.states]
    }

    fn row_mut(&mut self, frame: usize) -> &mut [f64] {
        &mut self.data[frame * self.states..(frame + 1) * self.states]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics, and a zero-width matrix has no rows worth yielding
        self.data.chunks_exact(self.states.max(1)).take(self.frames)
    }
}

/// Scale a vector to unit L2 norm. Silent vectors stay (near) zero.
pub fn l2_normalize(v: &Chroma) -> Chroma {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt() + NORM_EPSILON;
    let mut out = *v;
    for x in &mut out {
        *x /= norm;
    }
    out
}

/// Raw cosine similarity of every frame against every template.
///
/// Entry `(t, j)` lies in [-1, 1]; for non-negative chroma it lies in [0, 1].
pub fn cosine_similarity(features: &[Chroma], templates: &[Chroma]) -> ScoreMatrix {
    let templates: Vec<Chroma> = templates.iter().map(l2_normalize).collect();
    let mut scores = ScoreMatrix::zeros(features.len(), templates.len());

    for (t, frame) in features.iter().enumerate() {
        let frame = l2_normalize(frame);
        let row = scores.row_mut(t);
        for (j, template) in templates.iter().enumerate() {
            row[j] = (0..PITCH_CLASSES).map(|i| frame[i] * template[i]).sum();
        }
    }

    scores
}

/// Normalized Gaussian weights for offsets `-radius..=radius`, with the
/// radius clamped to `max_radius`.
fn gaussian_kernel(sigma: f64, max_radius: i64) -> Vec<f64> {
    if sigma.is_nan() || sigma <= 0.0 {
        return vec![1.0];
    }

    let radius = (KERNEL_TRUNCATE * sigma + 0.5).min(max_radius as f64) as i64;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / (sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Sum kernel taps that reflect onto the same sample. Reflection repeats
/// every `2 * frames`, so the result has one weight per offset `0..2 * frames`.
fn fold_kernel(kernel: &[f64], frames: usize) -> Vec<f64> {
    let radius = (kernel.len() / 2) as i64;
    let period = 2 * frames as i64;
    let mut folded = vec![0.0; period as usize];
    for (k, weight) in kernel.iter().enumerate() {
        folded[(k as i64 - radius).rem_euclid(period) as usize] += weight;
    }
    folded
}

/// Map an out-of-range index back into `0..len` by half-sample symmetric
/// reflection (`d c b a | a b c d | d c b a`), periodic for large offsets.
fn reflect_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    let period = 2 * len;
    let m = index.rem_euclid(period);
    if m >= len {
        (period - 1 - m) as usize
    } else {
        m as usize
    }
}

/// Smooth every column independently along the time axis.
///
/// Very wide kernels are clamped to `MAX_RADIUS_PERIODS` reflection periods
/// and folded, so cost stays bounded by the frame count for any sigma.
pub fn gaussian_smooth(scores: &ScoreMatrix, sigma: f64) -> ScoreMatrix {
    let frames = scores.frames();
    let max_radius = MAX_RADIUS_PERIODS * 2 * frames as i64;
    let kernel = gaussian_kernel(sigma, max_radius);
    if kernel.len() == 1 || scores.is_empty() {
        return scores.clone();
    }

    // (first offset, weights) with offsets running first..first + len
    let (first, weights) = if kernel.len() > 2 * frames {
        (0, fold_kernel(&kernel, frames))
    } else {
        (-((kernel.len() / 2) as i64), kernel)
    };

    let mut smoothed = ScoreMatrix::zeros(frames, scores.states());
    for t in 0..frames {
        let row = smoothed.row_mut(t);
        for (k, weight) in weights.iter().enumerate() {
            let source = reflect_index(t as i64 + first + k as i64, frames);
            for (out, value) in row.iter_mut().zip(scores.row(source)) {
                *out += weight * value;
            }
        }
    }

    smoothed
}

/// Frame-by-template similarity, smoothed along time.
pub fn score(features: &[Chroma], templates: &[Chroma], sigma: f64) -> ScoreMatrix {
    gaussian_smooth(&cosine_similarity(features, templates), sigma)
}
