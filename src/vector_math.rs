use std::cmp::Ordering;

/// Cosine similarity in `[-1, 1]`; 0.0 for empty, mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

/// Indices of `candidates` ordered by descending cosine similarity to `query`.
/// Ties keep their original order.
pub fn rank_descending_by_cosine<'a, I>(query: &[f32], candidates: I) -> Vec<(usize, f32)>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut scores: Vec<(usize, f32)> = candidates
        .into_iter()
        .enumerate()
        .map(|(idx, candidate)| (idx, cosine_similarity(query, candidate)))
        .collect();

    scores.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let vec = vec![1.0, 2.0, 3.0, 4.0];
        assert!(approx_eq(cosine_similarity(&vec, &vec), 1.0));
    }

    #[test]
    fn cosine_is_zero_for_orthogonal_vectors() {
        assert!(approx_eq(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0));
    }

    #[test]
    fn cosine_is_zero_for_degenerate_input() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn ranking_returns_highest_similarity_first() {
        let query = vec![1.0, 0.0];
        let candidates = [vec![0.8, 0.2], vec![0.1, 0.9], vec![0.9, 0.0]];
        let ranked = rank_descending_by_cosine(&query, candidates.iter().map(Vec::as_slice));

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, 2);
        assert_eq!(ranked[2].0, 1);
    }
}
