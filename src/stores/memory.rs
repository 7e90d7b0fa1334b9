//! In-memory [`DocumentStore`] for tests, demos, and embedded use.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::types::RagStashError;

use super::{DocumentStore, IndexedItem, SearchFilters};

/// A [`DocumentStore`] backed by a plain in-process vector.
///
/// Insertion order is preserved so listing is deterministic, which the
/// aggregator's first-seen tie-breaking relies on in tests.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    items: RwLock<Vec<IndexedItem>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items (chunks and placeholders included).
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn put(&self, item: IndexedItem) -> Result<(), RagStashError> {
        let mut items = self.items.write();
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(RagStashError::Storage(format!(
                "item '{}' already exists",
                item.id
            )));
        }
        items.push(item);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<IndexedItem>, RagStashError> {
        Ok(self.items.read().iter().find(|item| item.id == id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, RagStashError> {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|item| item.id != id);
        Ok(items.len() < before)
    }

    async fn list_by_filter(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<IndexedItem>, RagStashError> {
        Ok(self
            .items
            .read()
            .iter()
            .filter(|item| filters.matches(item))
            .cloned()
            .collect())
    }

    async fn list_tags_for(&self, id: &str) -> Result<Vec<String>, RagStashError> {
        Ok(self
            .items
            .read()
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.tags.clone())
            .unwrap_or_default())
    }
}
