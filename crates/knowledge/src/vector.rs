//! Cosine similarity and chunk ranking.

use mathmentor_core::KnowledgeChunk;

/// Cosine similarity of two embeddings, in [-1, 1].
///
/// Accumulates in f64 so long vectors keep precision. Mismatched lengths,
/// empty input, and a near-zero norm all score 0.0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    let norm_a: f64 = a.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    let norm_b: f64 = b.iter().map(|&y| f64::from(y) * f64::from(y)).sum();

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank chunks by cosine similarity to a query embedding.
///
/// Returns up to `k` chunks sorted by descending similarity. Ties keep their
/// original document order.
pub fn rank<'a>(
    chunks: &'a [KnowledgeChunk],
    query_embedding: &[f32],
    k: usize,
) -> Vec<&'a KnowledgeChunk> {
    let mut scored: Vec<(f32, &KnowledgeChunk)> = chunks
        .iter()
        .map(|chunk| (cosine_similarity(&chunk.embedding, query_embedding), chunk))
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored.into_iter().map(|(_, chunk)| chunk).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, embedding: Vec<f32>) -> KnowledgeChunk {
        KnowledgeChunk {
            text: text.to_string(),
            embedding,
        }
    }

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![0.3, 0.6, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let sim = cosine_similarity(&[0.0, 2.0, 0.0], &[3.0, 0.0, 0.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let sim = cosine_similarity(&[2.0, 0.0], &[-2.0, 0.0]);
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_lengths_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn zero_vector_scores_zero_not_nan() {
        let sim = cosine_similarity(&[0.0, 0.0, 0.0], &[0.4, 0.8, 0.2]);
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn rank_orders_by_similarity() {
        let query = vec![1.0, 0.0, 0.0];
        let chunks = vec![
            chunk("orthogonal", vec![0.0, 1.0, 0.0]),
            chunk("identical", vec![1.0, 0.0, 0.0]),
            chunk("partial", vec![0.5, 0.5, 0.0]),
        ];

        let ranked = rank(&chunks, &query, 10);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].text, "identical");
        assert_eq!(ranked[1].text, "partial");
        assert_eq!(ranked[2].text, "orthogonal");
    }

    #[test]
    fn rank_respects_k() {
        let query = vec![1.0, 0.0];
        let chunks: Vec<_> = (0..10)
            .map(|i| chunk(&format!("c{i}"), vec![1.0, i as f32 * 0.1]))
            .collect();

        let ranked = rank(&chunks, &query, 2);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn rank_on_empty_index() {
        let ranked = rank(&[], &[1.0, 0.0], 2);
        assert!(ranked.is_empty());
    }
}
