//! Pipeline orchestration: index the corpus, retrieve context, generate
//! an answer.
//!
//! [`Pipeline`] owns its collaborators explicitly: the embedder, the
//! storage backend, and the generator are constructed by the caller and
//! passed in. Nothing is resolved from ambient globals, so tests can
//! swap any collaborator for a fake.
//!
//! Error policy: [`Pipeline::index_corpus`] never returns `Err`; its
//! failures surface as an [`IndexingOutcome`] value and
//! [`Pipeline::run`] logs them and continues. Retrieval and generation
//! failures propagate and abort the run.

pub mod indexing;
pub mod prompt;
pub mod retrieval;

pub use indexing::{IndexingOutcome, IndexingPhase, IndexingStats};
pub use prompt::{PROMPT_TEMPLATE, build_prompt};
pub use retrieval::RetrievedSection;

use std::sync::Arc;

use rig::embeddings::EmbeddingModel;
use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::corpus;
use crate::generation::Generator;
use crate::stores::{Backend, SectionRecord};
use crate::types::PipelineError;
use indexing::build_section_records;

/// Summary of a full pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// What the indexing stage did.
    pub indexing: IndexingOutcome,
    /// Number of sections retrieved for the question.
    pub retrieved: usize,
    /// The generated answer.
    pub answer: String,
}

/// Single-shot question-answering pipeline.
///
/// One instance performs one run: index the configured corpus into the
/// store, retrieve the sections most similar to the configured question,
/// and generate an answer from them.
pub struct Pipeline<E>
where
    E: EmbeddingModel,
{
    config: PipelineConfig,
    embedder: E,
    store: Arc<dyn Backend>,
    generator: Arc<dyn Generator>,
}

impl<E> Pipeline<E>
where
    E: EmbeddingModel,
{
    /// Assembles a pipeline from its collaborators.
    pub fn new(
        config: PipelineConfig,
        embedder: E,
        store: Arc<dyn Backend>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            config,
            embedder,
            store,
            generator,
        }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads, splits, selects, embeds, and stores the corpus.
    ///
    /// Failures never abort the caller: they come back inside the
    /// returned [`IndexingOutcome`] tagged with the phase that failed.
    /// An empty selection completes without touching the embedder or
    /// the store.
    pub async fn index_corpus(&self) -> IndexingOutcome {
        let corpus_text = match corpus::read_corpus(&self.config.corpus_path).await {
            Ok(text) => text,
            Err(err) => {
                return IndexingOutcome::failed(IndexingPhase::LoadCorpus, err.to_string());
            }
        };

        let sections = corpus::split_sections(&corpus_text, &self.config.delimiter);
        let total_sections = sections.len();
        let selected = self.config.window.apply(&sections);

        if selected.is_empty() {
            info!(total_sections, "selection window is empty; nothing to index");
            return IndexingOutcome::Completed(IndexingStats {
                total_sections,
                selected: 0,
                indexed: 0,
            });
        }

        let source = self.config.corpus_path.display().to_string();
        let records = build_section_records(
            selected,
            self.config.window.start,
            &source,
            &self.config.delimiter,
        );
        let selected_count = records.len();

        // One batch request for the whole selection
        let contents: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
        let embeddings = match self.embedder.embed_texts(contents).await {
            Ok(embeddings) => embeddings,
            Err(err) => return IndexingOutcome::failed(IndexingPhase::Embed, err.to_string()),
        };
        if embeddings.len() != records.len() {
            return IndexingOutcome::failed(
                IndexingPhase::Embed,
                format!(
                    "embedder returned {} vectors for {} sections",
                    embeddings.len(),
                    records.len()
                ),
            );
        }

        let records: Vec<SectionRecord> = records
            .into_iter()
            .zip(embeddings)
            .map(|(record, embedding)| {
                let vector: Vec<f32> = embedding.vec.into_iter().map(|v| v as f32).collect();
                record.with_embedding(vector)
            })
            .collect();

        match self.store.insert_sections(records).await {
            Ok(()) => IndexingOutcome::Completed(IndexingStats {
                total_sections,
                selected: selected_count,
                indexed: selected_count,
            }),
            Err(err) => IndexingOutcome::failed(IndexingPhase::Store, err.to_string()),
        }
    }

    /// Embeds the configured question and searches the store.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Retrieval`] when the embedder or the
    /// store fails. An empty index yields an empty result, not an error.
    pub async fn retrieve(&self) -> Result<Vec<RetrievedSection>, PipelineError> {
        let question = self.config.question.clone();
        let embeddings = self
            .embedder
            .embed_texts(vec![question])
            .await
            .map_err(|err| PipelineError::Retrieval(err.to_string()))?;
        let query = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| {
                PipelineError::Retrieval("embedder returned no vector for the question".to_string())
            })?;
        let query: Vec<f32> = query.vec.into_iter().map(|v| v as f32).collect();

        let hits = self
            .store
            .search_similar(&query, self.config.top_k)
            .await
            .map_err(|err| PipelineError::Retrieval(err.to_string()))?;
        Ok(hits.into_iter().map(RetrievedSection::from).collect())
    }

    /// Assembles the prompt and calls the generator with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Generation`] when the model call fails.
    pub async fn generate_answer(
        &self,
        context: &[RetrievedSection],
    ) -> Result<String, PipelineError> {
        let prompt = prompt::build_prompt(&self.config.question);
        self.generator.generate(&prompt, context).await
    }

    /// Runs the whole pipeline once.
    ///
    /// Indexing failures are logged and the run continues against
    /// whatever index state already exists; retrieval and generation
    /// failures abort with an error.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let indexing = self.index_corpus().await;
        match &indexing {
            IndexingOutcome::Completed(stats) => {
                info!(
                    total_sections = stats.total_sections,
                    selected = stats.selected,
                    indexed = stats.indexed,
                    "corpus indexed"
                );
            }
            IndexingOutcome::Failed { phase, reason } => {
                error!(%phase, %reason, "indexing failed; continuing with the existing index state");
            }
        }

        let context = self.retrieve().await?;
        info!(retrieved = context.len(), "similar sections retrieved");

        let answer = self.generate_answer(&context).await?;
        Ok(RunReport {
            indexing,
            retrieved: context.len(),
            answer,
        })
    }
}
