//! ```text
//! corpus file ──► corpus::read_corpus ──► corpus::split_sections
//!                                                 │
//!                              corpus::SelectionWindow (start, count)
//!                                                 │
//! Pipeline::index_corpus ──► EmbeddingModel::embed_texts (one batch)
//!                                                 │
//!                              stores::Backend::insert_sections
//!
//! Pipeline::retrieve ──► question embedding ──► Backend::search_similar
//!
//! Pipeline::generate_answer ──► pipeline::build_prompt
//!                            └─► generation::Generator ──► answer text
//! ```
//!
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod generation;
pub mod pipeline;
pub mod stores;
pub mod types;

pub use config::{ModelConfig, PipelineConfig, Provider};
pub use pipeline::{IndexingOutcome, IndexingStats, Pipeline, RunReport};
pub use types::PipelineError;
