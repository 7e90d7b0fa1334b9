//! Shared error types for the ragstash pipeline.
//!
//! The error policy follows the pipeline's absorption rules: chunking never
//! fails, embedding failures degrade to zero vectors inside the providers, and
//! scoring shape mismatches collapse to a zero score. What remains here are the
//! conditions callers genuinely need to handle — storage faults, unusable
//! input, and embedding backends that cannot even report a dimension.

use thiserror::Error;

/// Errors surfaced by the ingestion and retrieval pipeline.
#[derive(Debug, Error)]
pub enum RagStashError {
    /// The embedding backend reported a failure it could not absorb.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The document store collaborator reported a failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// The supplied document or query cannot be processed.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
