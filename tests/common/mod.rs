//! Shared fixtures for the integration tests: an in-memory store, canned
//! and failing collaborators, and corpus builders.

use std::sync::Mutex;

use async_trait::async_trait;

use askdocs::config::DEFAULT_DELIMITER;
use askdocs::generation::Generator;
use askdocs::pipeline::RetrievedSection;
use askdocs::stores::{Backend, SectionRecord};
use askdocs::types::PipelineError;

/// In-memory [`Backend`] with brute-force cosine search.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<Vec<SectionRecord>>,
}

#[allow(dead_code)]
impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything inserted so far.
    pub fn snapshot(&self) -> Vec<SectionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn insert_sections(&self, sections: Vec<SectionRecord>) -> Result<(), PipelineError> {
        let mut records = self.records.lock().unwrap();
        records.extend(sections.into_iter().filter(|s| s.embedding.is_some()));
        Ok(())
    }

    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(SectionRecord, f32)>, PipelineError> {
        let records = self.records.lock().unwrap();
        let mut scored: Vec<(SectionRecord, f32)> = records
            .iter()
            .filter_map(|record| {
                let embedding = record.embedding.as_ref()?;
                Some((record.clone(), cosine_similarity(embedding, query_embedding)))
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize, PipelineError> {
        Ok(self.records.lock().unwrap().len())
    }
}

#[allow(dead_code)]
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// [`Backend`] whose every operation fails with a storage error.
#[allow(dead_code)]
pub struct FailingBackend;

#[async_trait]
impl Backend for FailingBackend {
    async fn insert_sections(&self, _sections: Vec<SectionRecord>) -> Result<(), PipelineError> {
        Err(PipelineError::Storage("disk full".to_string()))
    }

    async fn search_similar(
        &self,
        _query_embedding: &[f32],
        _top_k: usize,
    ) -> Result<Vec<(SectionRecord, f32)>, PipelineError> {
        Err(PipelineError::Storage("disk full".to_string()))
    }

    async fn count(&self) -> Result<usize, PipelineError> {
        Err(PipelineError::Storage("disk full".to_string()))
    }
}

/// [`Generator`] returning a fixed answer and recording its calls.
pub struct CannedGenerator {
    answer: String,
    calls: Mutex<Vec<(String, usize)>>,
}

#[allow(dead_code)]
impl CannedGenerator {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Recorded `(prompt, context length)` pairs, one per call.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(
        &self,
        prompt: &str,
        context: &[RetrievedSection],
    ) -> Result<String, PipelineError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), context.len()));
        Ok(self.answer.clone())
    }
}

/// [`Generator`] that always fails.
#[allow(dead_code)]
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _context: &[RetrievedSection],
    ) -> Result<String, PipelineError> {
        Err(PipelineError::Generation("model unavailable".to_string()))
    }
}

/// Joins sections into a corpus with the default delimiter between them.
#[allow(dead_code)]
pub fn delimited_corpus(sections: &[&str]) -> String {
    sections.join(&format!("\n{DEFAULT_DELIMITER}\n"))
}
