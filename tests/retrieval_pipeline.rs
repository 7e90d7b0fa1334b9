//! Integration tests for the full ingest-then-search pipeline.
//!
//! Everything runs against the in-memory store with mock embeddings,
//! suitable for CI and deterministic testing.

use std::sync::Arc;

use ragstash::{
    ChunkingConfig, DocumentStore, IngestOptions, Ingestor, InMemoryDocumentStore,
    MockEmbeddingProvider, Retriever, SearchFilters,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ragstash=debug")
        .with_test_writer()
        .try_init();
}

fn pipeline() -> (Arc<InMemoryDocumentStore>, Ingestor, Retriever) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let provider = Arc::new(MockEmbeddingProvider::new());
    let ingestor = Ingestor::new(store.clone(), provider.clone());
    let retriever = Retriever::new(store.clone(), provider);
    (store, ingestor, retriever)
}

/// Paragraph of `words` distinct words, seeded so paragraphs differ.
fn paragraph(words: usize, seed: usize) -> String {
    (0..words)
        .map(|i| format!("term{}", (seed * 131 + i * 17) % 1009))
        .collect::<Vec<_>>()
        .join(" ")
        + "."
}

fn long_document() -> String {
    format!(
        "{}\n\n{}\n\n{}\n\n{}",
        paragraph(350, 1),
        paragraph(350, 2),
        paragraph(350, 3),
        paragraph(350, 4)
    )
}

#[tokio::test]
async fn exact_content_query_ranks_its_document_first() {
    init_tracing();
    let (_, ingestor, retriever) = pipeline();

    let content = "Rotate the access keys every ninety days without exception.";
    ingestor
        .ingest("Key Rotation", content, IngestOptions::default())
        .await
        .unwrap();
    ingestor
        .ingest(
            "Lunch Menu",
            "Soup of the day is tomato, served with fresh bread.",
            IngestOptions::default(),
        )
        .await
        .unwrap();

    let results = retriever
        .search(content, &SearchFilters::any(), 10)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Key Rotation");
    assert!(!results[0].is_chunk_result);
    // Identical text and identical mock embedding: a perfect fused score.
    assert!((results[0].similarity - 1.0).abs() < 1e-6);
    assert!(results[0].similarity > results[1].similarity);
}

#[tokio::test]
async fn chunked_document_appears_once_in_results() {
    init_tracing();
    let (store, ingestor, retriever) = pipeline();

    let report = ingestor
        .ingest("Big Handbook", &long_document(), IngestOptions::default())
        .await
        .unwrap();
    assert!(report.total_chunks > 1, "document should have been chunked");
    // Placeholder plus one item per chunk.
    assert_eq!(store.len(), report.total_chunks + 1);

    ingestor
        .ingest(
            "Small Note",
            "A short reminder about nothing in particular.",
            IngestOptions::default(),
        )
        .await
        .unwrap();

    let results = retriever
        .search("handbook guidance", &SearchFilters::any(), 10)
        .await
        .unwrap();

    assert_eq!(results.len(), 2, "one entry per document, chunks collapsed");
    let handbook = results
        .iter()
        .find(|r| r.title == "Big Handbook")
        .expect("chunked document should be retrievable");
    assert_eq!(handbook.id, report.id, "parent id surfaces, not a chunk id");
    assert!(handbook.is_chunk_result);
    assert!(!handbook.content_preview.is_empty());
}

#[tokio::test]
async fn filters_narrow_the_candidate_set() {
    init_tracing();
    let (_, ingestor, retriever) = pipeline();

    ingestor
        .ingest(
            "Work Doc",
            "Engineering development notes for the project milestone.",
            IngestOptions {
                partition: "work".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    ingestor
        .ingest(
            "Home Doc",
            "Grocery list and weekend plans.",
            IngestOptions {
                partition: "home".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let work_only = retriever
        .search(
            "notes",
            &SearchFilters::any().with_partition("work"),
            10,
        )
        .await
        .unwrap();
    assert_eq!(work_only.len(), 1);
    assert_eq!(work_only[0].title, "Work Doc");

    let technical = retriever
        .search("notes", &SearchFilters::any().with_tag("technical"), 10)
        .await
        .unwrap();
    assert_eq!(technical.len(), 1, "tag extraction feeds the tag filter");
    assert_eq!(technical[0].title, "Work Doc");

    let none = retriever
        .search("notes", &SearchFilters::any().with_partition("void"), 10)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn deleted_documents_stop_matching() {
    init_tracing();
    let (store, ingestor, retriever) = pipeline();

    let report = ingestor
        .ingest(
            "Ephemeral",
            "This document will be removed shortly.",
            IngestOptions::default(),
        )
        .await
        .unwrap();

    let before = retriever
        .search("removed", &SearchFilters::any(), 10)
        .await
        .unwrap();
    assert_eq!(before.len(), 1);

    assert!(store.delete(&report.id).await.unwrap());
    let after = retriever
        .search("removed", &SearchFilters::any(), 10)
        .await
        .unwrap();
    assert!(after.is_empty());
}

#[tokio::test]
async fn serialized_results_carry_no_embedding_data() {
    init_tracing();
    let (_, ingestor, retriever) = pipeline();

    ingestor
        .ingest("Doc", &long_document(), IngestOptions::default())
        .await
        .unwrap();

    let results = retriever
        .search("anything at all", &SearchFilters::any(), 10)
        .await
        .unwrap();
    assert!(!results.is_empty());

    let json = serde_json::to_value(&results).unwrap();
    for record in json.as_array().unwrap() {
        let keys: Vec<&str> = record.as_object().unwrap().keys().map(String::as_str).collect();
        assert!(!keys.contains(&"embedding"), "raw vectors must not leak: {keys:?}");
        assert!(keys.contains(&"similarity"));
        assert!(keys.contains(&"content_preview"));
    }
}

#[tokio::test]
async fn custom_chunking_config_flows_through_ingestion() {
    init_tracing();
    let store = Arc::new(InMemoryDocumentStore::new());
    let provider = Arc::new(MockEmbeddingProvider::new());
    let ingestor = Ingestor::new(store.clone(), provider)
        .with_config(ChunkingConfig::default().with_max_words(100).with_chunk_threshold(100));

    let report = ingestor
        .ingest(
            "Tuned",
            &format!("{}\n\n{}", paragraph(90, 7), paragraph(90, 8)),
            IngestOptions::default(),
        )
        .await
        .unwrap();

    // 180 words would be stored whole under the defaults; the tightened
    // threshold forces the chunked branch.
    assert!(report.total_chunks > 1);
    for chunk in &report.chunks {
        assert!(chunk.word_count <= 100 + 2, "chunk stays near the budget");
    }
}
