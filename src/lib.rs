//! ```text
//! Raw document ──► ingestion::Ingestor ──┬─► stored whole (≤ threshold)
//!                                        └─► chunking::smart_chunk ──► parent + chunks
//!                                                    │
//!                                                    └─► embeddings::EmbeddingProvider
//!
//! IndexedItems ──► stores::DocumentStore (external persistence seam)
//!
//! Query ──► retrieval::Retriever ──► scoring::SimilarityScorer ──► ranked SearchResults
//!                     │
//!                     └─► best-chunk-per-document aggregation
//! ```
//!
pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod ingestion;
pub mod retrieval;
pub mod scoring;
pub mod stores;
pub mod types;

pub use chunking::smart_chunk;
pub use config::ChunkingConfig;
pub use embeddings::{DenseEmbedder, EmbeddingProvider, LexicalEmbedder, MockEmbeddingProvider};
pub use ingestion::{IngestOptions, IngestReport, Ingestor};
pub use retrieval::{Retriever, SearchResult};
pub use scoring::SimilarityScorer;
pub use stores::{DocumentStore, InMemoryDocumentStore, IndexedItem, SearchFilters};
pub use types::RagStashError;
