//! Corpus-relative lexical embeddings (TF-IDF projection).

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use unicode_segmentation::UnicodeSegmentation;

use crate::types::RagStashError;

use super::{EmbeddingProvider, zero_vector};

/// Default projection width for lexical embeddings.
pub const DEFAULT_LEXICAL_DIMENSION: usize = 100;

/// [`EmbeddingProvider`] that needs no model: texts are projected onto the
/// most frequent terms of everything embedded so far, weighted by TF-IDF and
/// zero-padded to a fixed dimension.
///
/// # Non-stationarity
///
/// Embeddings from this variant are **not stationary**: every `embed` call
/// adds unseen text to the process-lifetime corpus, and the term universe the
/// projection is built from grows with it. Calling `embed` on the same text
/// again after the corpus has changed legitimately yields a different vector.
/// This is a property of the variant, not a bug — compare relative rankings
/// within one corpus snapshot, never exact vectors across calls.
pub struct LexicalEmbedder {
    dimension: usize,
    corpus: RwLock<Corpus>,
}

#[derive(Default)]
struct Corpus {
    seen: HashSet<String>,
    term_totals: HashMap<String, usize>,
    doc_frequency: HashMap<String, usize>,
    documents: usize,
}

impl Corpus {
    /// The `width` most frequent corpus terms, most frequent first.
    /// Ties break alphabetically so the projection is deterministic.
    fn top_terms(&self, width: usize) -> Vec<&String> {
        let mut terms: Vec<(&String, usize)> = self
            .term_totals
            .iter()
            .map(|(term, total)| (term, *total))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms.truncate(width);
        terms.into_iter().map(|(term, _)| term).collect()
    }
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_LEXICAL_DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            corpus: RwLock::new(Corpus::default()),
        }
    }

    /// Number of distinct texts absorbed into the corpus so far.
    pub fn corpus_size(&self) -> usize {
        self.corpus.read().documents
    }
}

#[async_trait]
impl EmbeddingProvider for LexicalEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "lexical"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagStashError> {
        let counts = term_counts(text);

        {
            let mut corpus = self.corpus.write();
            if corpus.seen.insert(text.to_string()) {
                corpus.documents += 1;
                for (term, count) in &counts {
                    *corpus.term_totals.entry(term.clone()).or_default() += count;
                    *corpus.doc_frequency.entry(term.clone()).or_default() += 1;
                }
            }
        }

        let corpus = self.corpus.read();
        let mut vector = zero_vector(self.dimension);
        for (slot, term) in corpus.top_terms(self.dimension).into_iter().enumerate() {
            let Some(tf) = counts.get(term) else {
                continue;
            };
            let df = corpus.doc_frequency.get(term).copied().unwrap_or(1).max(1);
            let idf = (corpus.documents as f32 / df as f32).ln() + 1.0;
            vector[slot] = *tf as f32 * idf;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }
}

fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in text.unicode_words() {
        *counts.entry(word.to_lowercase()).or_insert(0) += 1;
    }
    counts
}
