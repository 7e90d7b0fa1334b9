//! Similarity scoring: guarded cosine plus a lexical/vector fusion.

use std::sync::Arc;

use tracing::debug;

use crate::embeddings::EmbeddingProvider;

/// Weight of the normalized edit-distance term in the fused score.
pub const LEXICAL_WEIGHT: f32 = 0.3;
/// Weight of the vector cosine term in the fused score.
pub const VECTOR_WEIGHT: f32 = 0.7;

/// Cosine similarity in `[-1, 1]`, guarded against degenerate input.
///
/// Empty, mismatched-length, or zero-magnitude vectors score exactly `0` —
/// never `NaN`, never an error. This keeps a single malformed embedding from
/// poisoning a whole search.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Edit-distance similarity scaled to `[0, 1]`, case-insensitive.
///
/// `1.0` for identical texts, `0.0` when one side is empty and the other is
/// not. No crate in our stack covers plain Levenshtein, so the two-row DP
/// lives here, private to the scorer.
pub fn lexical_similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let distance = levenshtein(&a, &b);
    let longest = a.len().max(b.len());
    1.0 - distance as f32 / longest as f32
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Fuses vector cosine similarity with lexical string similarity.
///
/// The score is `0.3 * lexical + 0.7 * cosine`; when the vector term cannot
/// be computed the lexical term stands alone, and total failure scores `0`.
#[derive(Clone)]
pub struct SimilarityScorer {
    provider: Arc<dyn EmbeddingProvider>,
}

impl SimilarityScorer {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// The embedding backend this scorer embeds queries with.
    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Fused similarity between two texts, embedding both.
    pub async fn fused_similarity(&self, query: &str, candidate: &str) -> f32 {
        let lexical = lexical_similarity(query, candidate);
        match (
            self.provider.embed(query).await,
            self.provider.embed(candidate).await,
        ) {
            (Ok(query_vec), Ok(candidate_vec)) => {
                fuse(lexical, cosine(&query_vec, &candidate_vec))
            }
            _ => {
                debug!(backend = self.provider.name(), "vector term unavailable; lexical-only score");
                lexical
            }
        }
    }

    /// Embed the query once, for scoring against many stored vectors.
    ///
    /// `None` means the vector term is unavailable and callers should score
    /// on the lexical term alone.
    pub async fn query_vector(&self, query: &str) -> Option<Vec<f32>> {
        match self.provider.embed(query).await {
            Ok(vector) => Some(vector),
            Err(err) => {
                debug!(backend = self.provider.name(), error = %err, "query embedding failed");
                None
            }
        }
    }

    /// Fused similarity of a stored item against a pre-embedded query.
    pub fn score_stored(
        &self,
        query_text: &str,
        query_vector: Option<&[f32]>,
        candidate_text: &str,
        candidate_vector: &[f32],
    ) -> f32 {
        let lexical = lexical_similarity(query_text, candidate_text);
        match query_vector {
            Some(query_vector) => fuse(lexical, cosine(query_vector, candidate_vector)),
            None => lexical,
        }
    }
}

fn fuse(lexical: f32, vector: f32) -> f32 {
    LEXICAL_WEIGHT * lexical + VECTOR_WEIGHT * vector
}
