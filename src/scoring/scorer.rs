use crate::embedding::Embedding;

/// Cosine similarity of two unit vectors (their inner product), clamped to `[-1, 1]`.
///
/// Both vectors must come from the same encoder. Callers guarantee equal
/// dimensions; extra components of the longer vector are ignored.
#[inline]
pub fn score(a: &Embedding, b: &Embedding) -> f32 {
    dot(a.as_slice(), b.as_slice()).clamp(-1.0, 1.0)
}

/// Scores every candidate against `query`, preserving candidate order.
pub fn score_all(query: &Embedding, candidates: &[Embedding]) -> Vec<f32> {
    candidates.iter().map(|c| score(query, c)).collect()
}

#[inline]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Percentage of `all_scores` strictly below `score`, rounded to 2 decimals.
///
/// Returns `0.0` for an empty population.
pub fn percentile(score: f32, all_scores: &[f32]) -> f32 {
    if all_scores.is_empty() {
        return 0.0;
    }

    let below = all_scores.iter().filter(|&&s| s < score).count();
    let pct = below as f64 / all_scores.len() as f64 * 100.0;
    ((pct * 100.0).round() / 100.0) as f32
}

/// Display form with four decimals (`0.8123`).
pub fn format_score(score: f32) -> String {
    format!("{:.4}", score)
}
