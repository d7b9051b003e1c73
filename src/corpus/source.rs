//! Reads the corpus file that feeds the pipeline.

use std::path::Path;
use tokio::fs;

use crate::types::PipelineError;

/// Reads the whole corpus file into memory as UTF-8 text.
///
/// The text comes back exactly as stored; splitting happens separately in
/// [`split_sections`](crate::corpus::split_sections). Failures carry the
/// offending path so the caller can report which file was expected.
pub async fn read_corpus(path: impl AsRef<Path>) -> Result<String, PipelineError> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::CorpusRead {
            path: path.to_path_buf(),
            source,
        })
}
