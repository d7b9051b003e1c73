//! Shared error type for the question-answering pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by pipeline stages.
///
/// External failures (embedder, vector store, generative model) are
/// wrapped with the stage that produced them, so callers can tell a
/// broken corpus read apart from a failed model call and react per
/// stage instead of per library.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The corpus file could not be read.
    #[error("failed to read corpus at {path}: {source}")]
    CorpusRead {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The embedder rejected or failed a batch request.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The vector store failed an insert or schema operation.
    #[error("storage failed: {0}")]
    Storage(String),

    /// Similarity search could not be completed.
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// The generative model call failed.
    #[error("generation failed: {0}")]
    Generation(String),

    /// A provider client could not be constructed.
    #[error("provider error ({provider}): {message}")]
    Provider {
        /// Which provider failed.
        provider: &'static str,
        /// What went wrong.
        message: String,
    },

    /// Configuration could not be resolved.
    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),
}
