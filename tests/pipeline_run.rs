use std::sync::Arc;

use askdocs::config::PipelineConfig;
use askdocs::corpus::SelectionWindow;
use askdocs::embedding::HashEmbeddingModel;
use askdocs::pipeline::{IndexingPhase, Pipeline, PROMPT_TEMPLATE};
use askdocs::stores::Backend;
use askdocs::types::PipelineError;

mod common;
use common::*;

fn write_corpus(dir: &tempfile::TempDir, sections: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("library-documentation.txt");
    std::fs::write(&path, delimited_corpus(sections)).expect("write corpus");
    path
}

#[tokio::test]
async fn test_run_indexes_retrieves_and_answers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_corpus(&dir, &["intro", "button", "accordion", "dialog"]);

    let config = PipelineConfig::default()
        .with_corpus_path(&path)
        .with_window(SelectionWindow::new(1, 2))
        .with_question("How do I use the accordion?");
    let store = Arc::new(MemoryBackend::new());
    let generator = Arc::new(CannedGenerator::new("Expand panels with <Accordion>."));
    let pipeline = Pipeline::new(
        config,
        HashEmbeddingModel,
        store.clone(),
        generator.clone(),
    );

    let report = pipeline.run().await.expect("run");

    let stats = report.indexing.stats().expect("completed indexing");
    assert_eq!(stats.total_sections, 4);
    assert_eq!(stats.selected, 2);
    assert_eq!(stats.indexed, 2);
    assert_eq!(report.retrieved, 2);
    assert_eq!(report.answer, "Expand panels with <Accordion>.");

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    let (prompt, context_len) = &calls[0];
    assert_eq!(
        prompt,
        &format!("{PROMPT_TEMPLATE}{}", pipeline.config().question)
    );
    assert_eq!(*context_len, 2);
    assert!(report.retrieved <= pipeline.config().top_k);
}

#[tokio::test]
async fn test_default_window_past_corpus_end_indexes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_corpus(&dir, &["a", "b", "c", "d", "e"]);

    // Five sections cannot satisfy the default (15, 17) window.
    let config = PipelineConfig::default().with_corpus_path(&path);
    let store = Arc::new(MemoryBackend::new());
    let generator = Arc::new(CannedGenerator::new("no context needed"));
    let pipeline = Pipeline::new(config, HashEmbeddingModel, store.clone(), generator);

    let report = pipeline.run().await.expect("run");

    let stats = report.indexing.stats().expect("completed indexing");
    assert_eq!(stats.total_sections, 5);
    assert_eq!(stats.selected, 0);
    assert_eq!(stats.indexed, 0);
    assert_eq!(store.count().await.expect("count"), 0);
    assert_eq!(report.retrieved, 0);
    assert_eq!(report.answer, "no context needed");
}

#[tokio::test]
async fn test_missing_corpus_is_logged_and_run_continues() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PipelineConfig::default().with_corpus_path(dir.path().join("absent.txt"));
    let store = Arc::new(MemoryBackend::new());
    let generator = Arc::new(CannedGenerator::new("answered anyway"));
    let pipeline = Pipeline::new(config, HashEmbeddingModel, store, generator);

    let report = pipeline.run().await.expect("run despite load failure");

    let (phase, reason) = report.indexing.failure().expect("failed indexing");
    assert_eq!(phase, IndexingPhase::LoadCorpus);
    assert!(reason.contains("failed to read corpus"), "reason: {reason}");
    assert_eq!(report.retrieved, 0);
    assert_eq!(report.answer, "answered anyway");
}

#[tokio::test]
async fn test_only_windowed_sections_become_retrievable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_corpus(&dir, &["intro", "button", "accordion", "dialog"]);

    let config = PipelineConfig::default()
        .with_corpus_path(&path)
        .with_window(SelectionWindow::new(1, 2));
    let store = Arc::new(MemoryBackend::new());
    let generator = Arc::new(CannedGenerator::new("ok"));
    let pipeline = Pipeline::new(config, HashEmbeddingModel, store.clone(), generator);

    let report = pipeline.run().await.expect("run");
    assert!(report.indexing.is_completed());

    let mut stored = store.snapshot();
    stored.sort_by_key(|record| record.section_index);
    let indices: Vec<usize> = stored.iter().map(|r| r.section_index).collect();
    assert_eq!(indices, vec![1, 2]);
    let contents: Vec<&str> = stored.iter().map(|r| r.content.trim()).collect();
    assert_eq!(contents, vec!["button", "accordion"]);

    let hits = pipeline.retrieve().await.expect("retrieve");
    assert_eq!(hits.len(), 2);
    for hit in &hits {
        assert!(
            ["button", "accordion"].contains(&hit.content.trim()),
            "unexpected hit: {}",
            hit.content
        );
    }
}

#[tokio::test]
async fn test_retrieval_failure_aborts_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_corpus(&dir, &["only section"]);

    let config = PipelineConfig::default()
        .with_corpus_path(&path)
        .with_window(SelectionWindow::new(0, 1));
    let generator = Arc::new(CannedGenerator::new("never returned"));
    let pipeline = Pipeline::new(
        config,
        HashEmbeddingModel,
        Arc::new(FailingBackend),
        generator.clone(),
    );

    let err = pipeline.run().await.expect_err("search failure is fatal");
    assert!(
        matches!(err, PipelineError::Retrieval(ref reason) if reason.contains("disk full")),
        "unexpected error: {err}"
    );
    assert!(generator.calls().is_empty(), "generator must not be reached");
}

#[tokio::test]
async fn test_generation_failure_aborts_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_corpus(&dir, &["only section"]);

    let config = PipelineConfig::default()
        .with_corpus_path(&path)
        .with_window(SelectionWindow::new(0, 1));
    let pipeline = Pipeline::new(
        config,
        HashEmbeddingModel,
        Arc::new(MemoryBackend::new()),
        Arc::new(FailingGenerator),
    );

    let err = pipeline.run().await.expect_err("generation failure is fatal");
    assert!(
        matches!(err, PipelineError::Generation(_)),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_reindexing_same_store_accumulates_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_corpus(&dir, &["alpha", "beta", "gamma"]);

    let config = PipelineConfig::default()
        .with_corpus_path(&path)
        .with_window(SelectionWindow::new(0, 2));
    let store = Arc::new(MemoryBackend::new());
    let generator = Arc::new(CannedGenerator::new("ok"));
    let pipeline = Pipeline::new(config, HashEmbeddingModel, store.clone(), generator);

    pipeline.run().await.expect("first run");
    pipeline.run().await.expect("second run");

    // Rows get fresh ids on every pass, so nothing is overwritten.
    assert_eq!(store.count().await.expect("count"), 4);
    let ids: std::collections::HashSet<String> =
        store.snapshot().into_iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 4);
}
