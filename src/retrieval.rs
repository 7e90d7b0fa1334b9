//! Query-time retrieval: score, aggregate, rank.
//!
//! Every scoreable stored item is scored against the query, chunks are
//! collapsed to the best-scoring chunk per parent document, and the
//! de-duplicated set is ranked and truncated. Aggregation runs over the full
//! scored set before any truncation, so a document's best chunk can never be
//! cut off by an early limit.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embeddings::EmbeddingProvider;
use crate::ingestion::summarize;
use crate::scoring::SimilarityScorer;
use crate::stores::{DocumentStore, IndexedItem, SearchFilters};
use crate::types::RagStashError;

/// Characters of content surfaced in result previews.
const PREVIEW_LENGTH: usize = 200;

/// One ranked search result. Raw embeddings are never exposed here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub doc_type: String,
    pub tags: Vec<String>,
    pub similarity: f32,
    pub content_preview: String,
    /// `true` when this record was resolved from a matching chunk rather
    /// than stored directly as the matched item.
    pub is_chunk_result: bool,
}

struct Candidate {
    item: IndexedItem,
    similarity: f32,
    from_chunk: bool,
}

/// Retrieval service: a document store plus a similarity scorer.
pub struct Retriever {
    store: Arc<dyn DocumentStore>,
    scorer: SimilarityScorer,
}

impl Retriever {
    pub fn new(store: Arc<dyn DocumentStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            scorer: SimilarityScorer::new(provider),
        }
    }

    /// Rank stored documents by fused similarity to `query`.
    ///
    /// Scoring failures degrade individual items to worst-case scores; they
    /// never abort the search. Only store access can fail here.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<SearchResult>, RagStashError> {
        let items = self.store.list_by_filter(filters).await?;
        let query_vector = self.scorer.query_vector(query).await;

        // Group while scoring: chunks collapse onto their parent's key, with
        // strict greater-than replacement so the first-seen chunk wins ties.
        let mut order: Vec<String> = Vec::new();
        let mut best: HashMap<String, Candidate> = HashMap::new();
        let mut scored = 0usize;

        for item in items.into_iter().filter(IndexedItem::is_scoreable) {
            let similarity = self.scorer.score_stored(
                query,
                query_vector.as_deref(),
                &item.content,
                &item.embedding,
            );
            scored += 1;

            let (key, from_chunk) = match (&item.is_chunk, &item.parent_id) {
                (true, Some(parent_id)) => (parent_id.clone(), true),
                // A chunk with no parent reference stands on its own.
                (true, None) => (item.id.clone(), true),
                (false, _) => (item.id.clone(), false),
            };

            match best.get_mut(&key) {
                Some(existing) => {
                    if similarity > existing.similarity {
                        *existing = Candidate {
                            item,
                            similarity,
                            from_chunk,
                        };
                    }
                }
                None => {
                    order.push(key.clone());
                    best.insert(
                        key,
                        Candidate {
                            item,
                            similarity,
                            from_chunk,
                        },
                    );
                }
            }
        }

        debug!(scored, groups = order.len(), "scored search candidates");

        // Stable sort keeps first-seen order among equal scores.
        let mut ranked: Vec<(String, Candidate)> = order
            .into_iter()
            .map(|key| {
                let candidate = best.remove(&key).expect("key recorded without candidate");
                (key, candidate)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.similarity.total_cmp(&a.1.similarity));
        ranked.truncate(limit);

        let mut results = Vec::with_capacity(ranked.len());
        for (key, candidate) in ranked {
            results.push(self.materialize(&key, candidate).await?);
        }
        Ok(results)
    }

    /// Turn a winning candidate into a caller-facing record.
    ///
    /// For chunk matches the parent document is resolved and surfaced; when
    /// the parent is missing the chunk is returned as its own standalone
    /// result rather than dropped.
    async fn materialize(
        &self,
        key: &str,
        candidate: Candidate,
    ) -> Result<SearchResult, RagStashError> {
        if candidate.from_chunk {
            if let Some(parent) = self.store.get(key).await? {
                if parent.id != candidate.item.id {
                    let tags = self.store.list_tags_for(&parent.id).await?;
                    return Ok(SearchResult {
                        id: parent.id,
                        title: parent.title,
                        doc_type: parent.doc_type,
                        tags,
                        similarity: candidate.similarity,
                        content_preview: summarize(&candidate.item.content, PREVIEW_LENGTH),
                        is_chunk_result: true,
                    });
                }
            }
        }

        let tags = self.store.list_tags_for(&candidate.item.id).await?;
        let item = candidate.item;
        Ok(SearchResult {
            id: item.id,
            title: item.title,
            doc_type: item.doc_type,
            tags,
            similarity: candidate.similarity,
            content_preview: summarize(&item.content, PREVIEW_LENGTH),
            is_chunk_result: candidate.from_chunk,
        })
    }
}
