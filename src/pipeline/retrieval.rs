//! Retrieved context handed to the generator.

use crate::stores::SectionRecord;

/// A section returned by similarity search.
///
/// Hits arrive ordered most similar first; `score` is the cosine
/// similarity reported by the backend.
#[derive(Debug, Clone)]
pub struct RetrievedSection {
    /// Identifier of the stored section.
    pub id: String,
    /// Corpus file the section came from.
    pub source: String,
    /// Absolute position of the section in the original split output.
    pub section_index: usize,
    /// The section text, verbatim.
    pub content: String,
    /// Cosine similarity against the question embedding.
    pub score: f32,
}

impl From<(SectionRecord, f32)> for RetrievedSection {
    fn from((record, score): (SectionRecord, f32)) -> Self {
        Self {
            id: record.id,
            source: record.source,
            section_index: record.section_index,
            content: record.content,
            score,
        }
    }
}
