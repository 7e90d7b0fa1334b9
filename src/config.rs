//! Configuration for the chunking pipeline.

use serde::{Deserialize, Serialize};

/// Default maximum chunk size, in words.
pub const DEFAULT_CHUNK_WORDS: usize = 500;
/// Default overlap carried between consecutive chunks, in words.
pub const DEFAULT_OVERLAP_WORDS: usize = 50;
/// Default word count above which a document is chunked on ingestion.
pub const DEFAULT_CHUNK_THRESHOLD: usize = 500;

/// Tunables for document segmentation and ingestion routing.
///
/// The three word budgets default to the same value but are deliberately
/// independent: `max_words` bounds individual chunks, `overlap_words` bounds
/// the tail carried into the next chunk, and `chunk_threshold` decides whether
/// a document is chunked at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum words per chunk. A single indivisible sentence may exceed this.
    pub max_words: usize,
    /// Word budget for the whole-unit overlap tail between consecutive chunks.
    pub overlap_words: usize,
    /// Documents at or below this word count are stored as a single item.
    pub chunk_threshold: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_CHUNK_WORDS,
            overlap_words: DEFAULT_OVERLAP_WORDS,
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
        }
    }
}

impl ChunkingConfig {
    /// Override the maximum chunk size.
    #[must_use]
    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    /// Override the overlap budget.
    #[must_use]
    pub fn with_overlap_words(mut self, overlap_words: usize) -> Self {
        self.overlap_words = overlap_words;
        self
    }

    /// Override the chunk-or-not threshold used at ingestion time.
    #[must_use]
    pub fn with_chunk_threshold(mut self, chunk_threshold: usize) -> Self {
        self.chunk_threshold = chunk_threshold;
        self
    }
}
