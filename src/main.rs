use std::sync::Arc;

use rig::completion::CompletionModel;
use rig::embeddings::EmbeddingModel;
use rig::prelude::*;
use rig::providers::{gemini, ollama};
use tracing::info;
use tracing_subscriber::EnvFilter;

use askdocs::config::{ModelConfig, PipelineConfig, Provider};
use askdocs::generation::RigGenerator;
use askdocs::pipeline::{Pipeline, RunReport};
use askdocs::stores::sqlite::SqliteSectionStore;
use askdocs::types::PipelineError;

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    init_tracing();

    let config = PipelineConfig::from_env()?;
    let models = ModelConfig::from_env()?;
    info!(
        provider = %models.provider,
        corpus = %config.corpus_path.display(),
        index = %config.index_name,
        "starting single-shot run"
    );

    let report = match models.provider {
        Provider::Gemini => {
            let client = gemini::Client::new(models.require_gemini_key()?).map_err(|err| {
                PipelineError::Provider {
                    provider: "gemini",
                    message: err.to_string(),
                }
            })?;
            let embedder = client
                .embedding_model_with_ndims(&models.embedding_model, models.embedding_dims);
            let completion = client.completion_model(&models.generation_model);
            run_with(config, embedder, completion).await?
        }
        Provider::Ollama => {
            let client: ollama::Client =
                ollama::Client::new(rig::client::Nothing).map_err(|err| {
                    PipelineError::Provider {
                        provider: "ollama",
                        message: err.to_string(),
                    }
                })?;
            let embedder = client
                .embedding_model_with_ndims(&models.embedding_model, models.embedding_dims);
            let completion = client.completion_model(&models.generation_model);
            run_with(config, embedder, completion).await?
        }
    };

    // Diagnostics go to stderr; stdout carries only the answer.
    println!("{}", report.answer);
    Ok(())
}

async fn run_with<E, M>(
    config: PipelineConfig,
    embedder: E,
    model: M,
) -> Result<RunReport, PipelineError>
where
    E: EmbeddingModel + Clone + Send + Sync + 'static,
    M: CompletionModel + 'static,
{
    let store = Arc::new(SqliteSectionStore::open(config.database_path(), &embedder).await?);
    let generator = Arc::new(RigGenerator::new(model));
    let pipeline = Pipeline::new(config, embedder, store, generator);

    let report = pipeline.run().await?;
    info!(
        indexing = report.indexing.variant_name(),
        retrieved = report.retrieved,
        "run finished"
    );
    Ok(report)
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
