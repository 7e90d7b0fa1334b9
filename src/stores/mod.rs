//! The document store seam.
//!
//! Persistence is an external collaborator: the pipeline only speaks the
//! [`DocumentStore`] trait and operates on in-memory [`IndexedItem`]s.
//! Transactions, schema, backups, and file handling all live behind the
//! trait, never in this crate.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::RagStashError;

pub use memory::InMemoryDocumentStore;

/// A stored, embeddable unit: either a whole document, a parent placeholder
/// for a chunked document, or one chunk of such a document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexedItem {
    pub id: String,
    pub partition: String,
    pub title: String,
    pub content: String,
    pub doc_type: String,
    pub tags: Vec<String>,
    /// Embedding vector; empty for parent placeholders.
    pub embedding: Vec<f32>,
    pub word_count: usize,
    pub char_count: usize,
    pub parent_id: Option<String>,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub is_chunk: bool,
}

impl IndexedItem {
    /// A parent placeholder holds the full original text of a chunked
    /// document but carries no embedding of its own.
    pub fn is_placeholder(&self) -> bool {
        !self.is_chunk && self.total_chunks > 1
    }

    /// Whether the item may be scored directly against a query.
    /// Placeholders and items without embeddings are excluded.
    pub fn is_scoreable(&self) -> bool {
        !self.embedding.is_empty() && !self.is_placeholder()
    }
}

/// Filters passed through to the store when listing candidate items.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub partition: Option<String>,
    pub doc_type: Option<String>,
    pub tag: Option<String>,
}

impl SearchFilters {
    /// All items, no filtering.
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    #[must_use]
    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Whether an item satisfies every set filter.
    pub fn matches(&self, item: &IndexedItem) -> bool {
        if let Some(partition) = &self.partition {
            if &item.partition != partition {
                return false;
            }
        }
        if let Some(doc_type) = &self.doc_type {
            if &item.doc_type != doc_type {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !item.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        true
    }
}

/// Async CRUD interface the external document store implements.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist an item. Items are immutable once written; re-ingestion
    /// deletes and recreates rather than editing in place.
    async fn put(&self, item: IndexedItem) -> Result<(), RagStashError>;

    /// Fetch a single item by id.
    async fn get(&self, id: &str) -> Result<Option<IndexedItem>, RagStashError>;

    /// Delete an item by id, reporting whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, RagStashError>;

    /// All items matching the filters, in stable insertion order.
    async fn list_by_filter(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<IndexedItem>, RagStashError>;

    /// Tags recorded for an item.
    async fn list_tags_for(&self, id: &str) -> Result<Vec<String>, RagStashError>;
}
