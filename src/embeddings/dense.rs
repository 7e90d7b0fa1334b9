//! Dense sentence embeddings backed by an external pretrained model.

use async_trait::async_trait;
use rig::embeddings::embedding::EmbeddingModel;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::types::RagStashError;

use super::{EmbeddingProvider, zero_vector};

/// Loads the embedding model on first use.
///
/// Loading happens inside [`DenseEmbedder`]'s single-flight guard, so a loader
/// only ever runs once per embedder regardless of concurrent callers.
#[async_trait]
pub trait ModelLoader: Send + Sync + 'static {
    type Model: EmbeddingModel + Send + Sync;

    async fn load(&self) -> Result<Self::Model, RagStashError>;
}

/// [`EmbeddingProvider`] delegating to a pretrained sentence-embedding model.
///
/// The model is initialized lazily and at most once: the first `embed` call
/// performs the load, concurrent callers await the same in-flight
/// initialization instead of triggering duplicate loads. Only a successful
/// load is cached — a failed load answers the current request with a zero
/// vector of the declared dimension and lets the next call retry, so a
/// transiently unavailable model does not wedge the embedder in degraded
/// mode for the life of the process.
pub struct DenseEmbedder<L: ModelLoader> {
    loader: L,
    dimension: usize,
    model: OnceCell<L::Model>,
}

impl<L: ModelLoader> DenseEmbedder<L> {
    /// Create an embedder that will load its model on first use.
    ///
    /// `dimension` is the model's declared output size; it is also the length
    /// of the zero vectors served while degraded.
    pub fn new(loader: L, dimension: usize) -> Self {
        Self {
            loader,
            dimension,
            model: OnceCell::new(),
        }
    }

    /// `true` once the model has been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Force the lazy initialization, reporting whether the model is usable.
    pub async fn preload(&self) -> bool {
        self.model().await.is_some()
    }

    async fn model(&self) -> Option<&L::Model> {
        match self
            .model
            .get_or_try_init(|| async {
                let model = self.loader.load().await?;
                info!(dimension = self.dimension, "embedding model loaded");
                Ok::<_, RagStashError>(model)
            })
            .await
        {
            Ok(model) => Some(model),
            Err(err) => {
                warn!(error = %err, "embedding model failed to load; serving zero vector");
                None
            }
        }
    }
}

#[async_trait]
impl<L: ModelLoader> EmbeddingProvider for DenseEmbedder<L> {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "dense"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagStashError> {
        let Some(model) = self.model().await else {
            return Ok(zero_vector(self.dimension));
        };

        match model.embed_texts(std::iter::once(text.to_string())).await {
            Ok(mut embeddings) if !embeddings.is_empty() => {
                let embedding = embeddings.remove(0);
                Ok(embedding.vec.into_iter().map(|v| v as f32).collect())
            }
            Ok(_) => {
                warn!("embedding model returned no vector; serving zero vector");
                Ok(zero_vector(self.dimension))
            }
            Err(err) => {
                warn!(error = %err, "embedding generation failed; serving zero vector");
                Ok(zero_vector(self.dimension))
            }
        }
    }
}
