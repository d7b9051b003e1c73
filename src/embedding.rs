//! Embedding model used for offline runs and tests.

use rig::embeddings::embedding::{Embedding, EmbeddingError, EmbeddingModel};

/// Dimensionality of [`HashEmbeddingModel`] vectors.
pub const HASH_EMBEDDING_DIMS: usize = 8;

/// Deterministic embedder that hashes text into a small fixed vector.
///
/// Identical text always maps to the same vector, so store behavior and
/// retrieval ordering are reproducible without a network embedder. The
/// vectors carry no semantic signal; production runs use a provider
/// model instead.
#[derive(Clone, Debug, Default)]
pub struct HashEmbeddingModel;

impl EmbeddingModel for HashEmbeddingModel {
    type Client = ();

    const MAX_DOCUMENTS: usize = 64;

    fn make(_client: &(), _model: impl Into<String>, _ndims: Option<usize>) -> Self {
        Self
    }

    fn ndims(&self) -> usize {
        HASH_EMBEDDING_DIMS
    }

    fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> impl std::future::Future<Output = Result<Vec<Embedding>, EmbeddingError>> + Send {
        let docs: Vec<String> = texts.into_iter().collect();
        async move {
            Ok(docs
                .into_iter()
                .map(|document| Embedding {
                    vec: hash_to_vec(&document),
                    document,
                })
                .collect())
        }
    }
}

/// Hashes `text` once per dimension, normalized into `[0.0, 1.0]`.
fn hash_to_vec(text: &str) -> Vec<f64> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    (0..HASH_EMBEDDING_DIMS)
        .map(|dim| {
            let mut hasher = DefaultHasher::new();
            dim.hash(&mut hasher);
            text.hash(&mut hasher);
            (hasher.finish() as f64) / (u64::MAX as f64)
        })
        .collect()
}
