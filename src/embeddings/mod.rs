//! Embedding capability for the retrieval pipeline.
//!
//! Everything downstream of chunking works against the [`EmbeddingProvider`]
//! trait: a fixed dimension plus a text-to-vector mapping. Two interchangeable
//! variants ship in-tree:
//!
//! * [`dense::DenseEmbedder`] — delegates to an external pretrained sentence
//!   model, loaded lazily and at most once.
//! * [`lexical::LexicalEmbedder`] — corpus-relative TF-IDF projection, no
//!   model required.
//!
//! [`MockEmbeddingProvider`] gives tests deterministic vectors without a model.

pub mod dense;
pub mod lexical;

use async_trait::async_trait;

use crate::types::RagStashError;

pub use dense::{DenseEmbedder, ModelLoader};
pub use lexical::LexicalEmbedder;

/// Maps text to a fixed-dimension vector.
///
/// Implementations are expected to absorb backend failures where they can
/// (degrading to a zero vector) so that a single bad embedding never aborts
/// an ingest or a search.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector returned by [`embed`](Self::embed).
    fn dimension(&self) -> usize;

    /// Short human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagStashError>;

    /// Embed a batch of texts, in order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagStashError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// A zero vector of the given dimension, the degraded-mode embedding.
pub fn zero_vector(dimension: usize) -> Vec<f32> {
    vec![0.0; dimension]
}

/// Deterministic hash-derived embeddings for tests and offline runs.
///
/// The vectors carry no semantics, but identical text always maps to the
/// identical vector, which is all the pipeline tests need.
#[derive(Clone, Debug, Default)]
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dimension: 8 }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "mock"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagStashError> {
        Ok(hash_to_vector(text, self.dimension))
    }
}

fn hash_to_vector(text: &str, dimension: usize) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish();
    (0..dimension)
        .map(|i| {
            let bits = seed.rotate_left((i * 8) as u32) ^ ((i as u64) << 24);
            (bits as f64 / u64::MAX as f64) as f32
        })
        .collect()
}
