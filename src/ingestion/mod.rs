//! Document ingestion: a two-branch pipeline from raw text to stored items.
//!
//! Documents at or below the chunking threshold become a single embedded
//! item. Longer documents become a parent placeholder (full text, no
//! embedding) plus one embedded item per chunk. Items are immutable once
//! stored; re-ingesting edited content means deleting the old item set and
//! ingesting anew.

pub mod analysis;

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::chunking::{count_words, smart_chunk};
use crate::config::ChunkingConfig;
use crate::embeddings::{EmbeddingProvider, zero_vector};
use crate::stores::{DocumentStore, IndexedItem};
use crate::types::RagStashError;

pub use analysis::{ContentAnalysis, analyze, detect_doc_type, extract_tags, summarize};

/// Optional knobs for a single ingest call.
#[derive(Clone, Debug)]
pub struct IngestOptions {
    /// Document type; auto-detected from content when `None`.
    pub doc_type: Option<String>,
    /// Target partition, passed through to the store.
    pub partition: String,
    /// Tags; auto-extracted from content when `None`.
    pub tags: Option<Vec<String>>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            doc_type: None,
            partition: "default".to_string(),
            tags: None,
        }
    }
}

/// Per-chunk record returned to the caller after a chunked ingest.
#[derive(Clone, Debug)]
pub struct ChunkSummary {
    pub id: String,
    pub index: usize,
    pub text: String,
    pub word_count: usize,
    pub char_count: usize,
}

/// Outcome of an ingest call.
#[derive(Clone, Debug)]
pub struct IngestReport {
    /// Id of the stored document: the single item, or the parent placeholder.
    pub id: String,
    pub doc_type: String,
    pub tags: Vec<String>,
    pub word_count: usize,
    pub char_count: usize,
    pub total_chunks: usize,
    /// Ordered chunk records; empty when the document was stored unchunked.
    pub chunks: Vec<ChunkSummary>,
}

/// Ingestion service wiring the chunker, an embedding backend, and the store.
pub struct Ingestor {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: ChunkingConfig,
}

impl Ingestor {
    pub fn new(store: Arc<dyn DocumentStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            config: ChunkingConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ChunkingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Ingest a document, routing it to the single-item or chunked branch by
    /// word count.
    pub async fn ingest(
        &self,
        title: &str,
        content: &str,
        options: IngestOptions,
    ) -> Result<IngestReport, RagStashError> {
        let word_count = count_words(content);
        let doc_type = options
            .doc_type
            .unwrap_or_else(|| detect_doc_type(content, title).to_string());
        let tags = options.tags.unwrap_or_else(|| extract_tags(content));

        if word_count > self.config.chunk_threshold {
            self.ingest_chunked(title, content, doc_type, tags, options.partition, word_count)
                .await
        } else {
            self.ingest_single(title, content, doc_type, tags, options.partition, word_count)
                .await
        }
    }

    async fn ingest_single(
        &self,
        title: &str,
        content: &str,
        doc_type: String,
        tags: Vec<String>,
        partition: String,
        word_count: usize,
    ) -> Result<IngestReport, RagStashError> {
        let id = Uuid::new_v4().to_string();
        let embedding = self.embed_or_zero(content).await;

        info!(%id, title, word_count, "storing document unchunked");

        self.store
            .put(IndexedItem {
                id: id.clone(),
                partition,
                title: title.to_string(),
                content: content.to_string(),
                doc_type: doc_type.clone(),
                tags: tags.clone(),
                embedding,
                word_count,
                char_count: content.len(),
                parent_id: None,
                chunk_index: 0,
                total_chunks: 1,
                is_chunk: false,
            })
            .await?;

        Ok(IngestReport {
            id,
            doc_type,
            tags,
            word_count,
            char_count: content.len(),
            total_chunks: 1,
            chunks: Vec::new(),
        })
    }

    async fn ingest_chunked(
        &self,
        title: &str,
        content: &str,
        doc_type: String,
        tags: Vec<String>,
        partition: String,
        word_count: usize,
    ) -> Result<IngestReport, RagStashError> {
        let chunk_texts = smart_chunk(content, title, &self.config);

        // A document that defies splitting (one enormous sentence, say) comes
        // back as a single chunk; storing it unchunked keeps the placeholder
        // invariant (total_chunks > 1) intact.
        if chunk_texts.len() <= 1 {
            return self
                .ingest_single(title, content, doc_type, tags, partition, word_count)
                .await;
        }

        let parent_id = Uuid::new_v4().to_string();
        let total_chunks = chunk_texts.len();

        info!(
            id = %parent_id,
            title,
            word_count,
            total_chunks,
            "chunking document for ingestion"
        );

        self.store
            .put(IndexedItem {
                id: parent_id.clone(),
                partition: partition.clone(),
                title: title.to_string(),
                content: content.to_string(),
                doc_type: doc_type.clone(),
                tags: tags.clone(),
                embedding: Vec::new(),
                word_count,
                char_count: content.len(),
                parent_id: None,
                chunk_index: 0,
                total_chunks,
                is_chunk: false,
            })
            .await?;

        let mut chunks = Vec::with_capacity(total_chunks);
        for (index, text) in chunk_texts.into_iter().enumerate() {
            let chunk_id = Uuid::new_v4().to_string();
            let embedding = self.embed_or_zero(&text).await;
            let chunk_words = count_words(&text);
            let chunk_chars = text.len();

            self.store
                .put(IndexedItem {
                    id: chunk_id.clone(),
                    partition: partition.clone(),
                    title: format!("{title} (Chunk {}/{})", index + 1, total_chunks),
                    content: text.clone(),
                    doc_type: doc_type.clone(),
                    tags: tags.clone(),
                    embedding,
                    word_count: chunk_words,
                    char_count: chunk_chars,
                    parent_id: Some(parent_id.clone()),
                    chunk_index: index,
                    total_chunks,
                    is_chunk: true,
                })
                .await?;

            chunks.push(ChunkSummary {
                id: chunk_id,
                index,
                text,
                word_count: chunk_words,
                char_count: chunk_chars,
            });
        }

        Ok(IngestReport {
            id: parent_id,
            doc_type,
            tags,
            word_count,
            char_count: content.len(),
            total_chunks,
            chunks,
        })
    }

    async fn embed_or_zero(&self, text: &str) -> Vec<f32> {
        match self.embedder.embed(text).await {
            Ok(vector) => vector,
            Err(err) => {
                warn!(
                    backend = self.embedder.name(),
                    error = %err,
                    "embedding failed during ingest; storing zero vector"
                );
                zero_vector(self.embedder.dimension())
            }
        }
    }
}
