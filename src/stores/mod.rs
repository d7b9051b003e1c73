//! Storage backends for section documents and their embeddings.
//!
//! The [`Backend`] trait abstracts over vector storage so the pipeline
//! can run against the production SQLite store or an in-memory fake
//! without changing its code.
//!
//! ```text
//!          ┌──────────────────┐
//!          │   Backend trait  │
//!          │ insert / search  │
//!          │     / count      │
//!          └────────┬─────────┘
//!                   │
//!                   ▼
//!        ┌────────────────────┐
//!        │ SqliteSectionStore │
//!        │ rig-sqlite + vec0  │
//!        └────────────────────┘
//! ```

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

pub use sqlite::{SectionDocument, SqliteSectionStore};

/// A corpus section with its embedding, ready for storage.
///
/// This is the backend-agnostic transport type; each backend converts it
/// to and from its own document representation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Unique identifier for this section.
    pub id: String,
    /// Corpus file the section came from.
    pub source: String,
    /// Absolute position of the section in the original split output.
    pub section_index: usize,
    /// The section text, verbatim.
    pub content: String,
    /// Additional metadata as JSON.
    pub metadata: serde_json::Value,
    /// The embedding vector, when computed.
    pub embedding: Option<Vec<f32>>,
}

impl SectionRecord {
    /// Creates a record without metadata or embedding.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        section_index: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            section_index,
            content: content.into(),
            metadata: serde_json::Value::Object(Default::default()),
            embedding: None,
        }
    }

    /// Sets additional metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the embedding vector.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

impl From<SectionRecord> for SectionDocument {
    fn from(record: SectionRecord) -> Self {
        SectionDocument {
            id: record.id,
            source: record.source,
            section_index: record.section_index,
            content: record.content,
            metadata: record.metadata,
        }
    }
}

impl From<SectionDocument> for SectionRecord {
    fn from(doc: SectionDocument) -> Self {
        SectionRecord {
            id: doc.id,
            source: doc.source,
            section_index: doc.section_index,
            content: doc.content,
            metadata: doc.metadata,
            embedding: None,
        }
    }
}

/// Unified interface for section storage backends.
///
/// Implementations handle the details of their storage system; the
/// pipeline only ever talks to this trait.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Inserts section records into the store.
    ///
    /// Records carrying an embedding become searchable; records without
    /// one are skipped. An empty batch is a no-op success.
    async fn insert_sections(&self, sections: Vec<SectionRecord>) -> Result<(), PipelineError>;

    /// Similarity search against a query embedding.
    ///
    /// Returns up to `top_k` sections ordered most similar first, each
    /// paired with its cosine similarity score.
    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(SectionRecord, f32)>, PipelineError>;

    /// Total number of sections in the store.
    async fn count(&self) -> Result<usize, PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_builders_fill_optional_fields() {
        let record = SectionRecord::new("id-1", "docs.txt", 15, "content")
            .with_metadata(serde_json::json!({"delimiter": "---"}))
            .with_embedding(vec![0.5, 0.25]);

        assert_eq!(record.section_index, 15);
        assert_eq!(record.metadata["delimiter"], "---");
        assert_eq!(record.embedding.as_deref(), Some(&[0.5, 0.25][..]));
    }

    #[test]
    fn record_document_conversion_round_trips_fields() {
        let record = SectionRecord::new("id-2", "docs.txt", 16, "text")
            .with_embedding(vec![1.0]);
        let doc = SectionDocument::from(record.clone());
        assert_eq!(doc.id, record.id);
        assert_eq!(doc.section_index, 16);

        let back = SectionRecord::from(doc);
        assert_eq!(back.content, "text");
        // Embeddings live outside the document representation.
        assert!(back.embedding.is_none());
    }
}
