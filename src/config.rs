//! Environment-driven configuration for the pipeline and its model providers.
//!
//! Configuration is resolved in two layers (later wins):
//!
//! 1. Compiled defaults, matching the stock demo corpus and question.
//! 2. Environment variables prefixed with `ASKDOCS_` (a `.env` file is
//!    loaded first when present).
//!
//! Everything the pipeline consumes is an explicit value on
//! [`PipelineConfig`] or [`ModelConfig`]; no stage reads the environment
//! on its own.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::corpus::SelectionWindow;

/// Delimiter used by the stock corpus: a literal run of 59 dashes.
pub const DEFAULT_DELIMITER: &str =
    "-----------------------------------------------------------";

/// Corpus file read when `ASKDOCS_CORPUS` is not set.
pub const DEFAULT_CORPUS_PATH: &str = "documentation/library-documentation.txt";

/// Index name (and stem of the default database file).
pub const DEFAULT_INDEX_NAME: &str = "documentation";

/// Question answered when `ASKDOCS_QUESTION` is not set.
pub const DEFAULT_QUESTION: &str = "I want an example how to use accordion.";

const DEFAULT_SELECT_START: usize = 15;
const DEFAULT_SELECT_COUNT: usize = 17;
const DEFAULT_TOP_K: usize = 3;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable was present but unparseable.
    #[error("failed to parse environment variable {key}: {message}")]
    EnvParse {
        /// Environment variable key.
        key: String,
        /// What was expected.
        message: String,
    },

    /// A required environment variable was absent.
    #[error("missing required environment variable {key}")]
    MissingEnv {
        /// Environment variable key.
        key: String,
    },

    /// A resolved value failed validation.
    #[error("invalid value for {field}: {message}")]
    Invalid {
        /// Configuration field name.
        field: String,
        /// Why the value was rejected.
        message: String,
    },
}

/// Settings for a single pipeline run.
///
/// The window defaults (`start = 15`, `count = 17`) are carried over from
/// the corpus this demo was originally written around. They are plain
/// configuration; nothing downstream attaches meaning to those numbers.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path of the corpus file to load.
    pub corpus_path: PathBuf,
    /// Literal delimiter the corpus is split on.
    pub delimiter: String,
    /// Contiguous sub-range of sections to index.
    pub window: SelectionWindow,
    /// Question driving retrieval and generation.
    pub question: String,
    /// Index name; also the stem of the default database file.
    pub index_name: String,
    /// Explicit database file, overriding `<index_name>.sqlite`.
    pub database_override: Option<PathBuf>,
    /// Number of sections retrieved for the question.
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from(DEFAULT_CORPUS_PATH),
            delimiter: DEFAULT_DELIMITER.to_string(),
            window: SelectionWindow::new(DEFAULT_SELECT_START, DEFAULT_SELECT_COUNT),
            question: DEFAULT_QUESTION.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            database_override: None,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl PipelineConfig {
    /// Resolves configuration from the environment on top of the defaults.
    ///
    /// Recognized variables: `ASKDOCS_CORPUS`, `ASKDOCS_DELIMITER`,
    /// `ASKDOCS_SELECT_START`, `ASKDOCS_SELECT_COUNT`, `ASKDOCS_QUESTION`,
    /// `ASKDOCS_INDEX`, `ASKDOCS_DB`, `ASKDOCS_TOP_K`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable fails to parse or the
    /// resolved configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(path) = env::var("ASKDOCS_CORPUS") {
            config.corpus_path = PathBuf::from(path);
        }
        if let Ok(delimiter) = env::var("ASKDOCS_DELIMITER") {
            config.delimiter = delimiter;
        }
        if let Ok(start) = env::var("ASKDOCS_SELECT_START") {
            config.window.start = parse_usize("ASKDOCS_SELECT_START", &start)?;
        }
        if let Ok(count) = env::var("ASKDOCS_SELECT_COUNT") {
            config.window.count = parse_usize("ASKDOCS_SELECT_COUNT", &count)?;
        }
        if let Ok(question) = env::var("ASKDOCS_QUESTION") {
            config.question = question;
        }
        if let Ok(index) = env::var("ASKDOCS_INDEX") {
            config.index_name = index;
        }
        if let Ok(db) = env::var("ASKDOCS_DB") {
            config.database_override = Some(PathBuf::from(db));
        }
        if let Ok(top_k) = env::var("ASKDOCS_TOP_K") {
            config.top_k = parse_usize("ASKDOCS_TOP_K", &top_k)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Sets the corpus file path.
    #[must_use]
    pub fn with_corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpus_path = path.into();
        self
    }

    /// Sets the section delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Sets the selection window.
    #[must_use]
    pub fn with_window(mut self, window: SelectionWindow) -> Self {
        self.window = window;
        self
    }

    /// Sets the question to answer.
    #[must_use]
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    /// Sets the index name.
    #[must_use]
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    /// Sets an explicit database file.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_override = Some(path.into());
        self
    }

    /// Sets the number of sections to retrieve.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Database file backing the index: the explicit override when set,
    /// otherwise `<index_name>.sqlite` in the working directory.
    pub fn database_path(&self) -> PathBuf {
        self.database_override
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.sqlite", self.index_name)))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.is_empty() {
            return Err(ConfigError::Invalid {
                field: "delimiter".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.index_name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "index_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.top_k == 0 {
            return Err(ConfigError::Invalid {
                field: "top_k".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// External model provider backing embeddings and generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Google Gemini (requires `GEMINI_API_KEY`).
    Gemini,
    /// Local Ollama server on the default port.
    Ollama,
}

impl Provider {
    /// Parses a provider name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// Settings for the provider-backed embedder and completion model.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Which provider to construct clients for.
    pub provider: Provider,
    /// Embedding model name.
    pub embedding_model: String,
    /// Embedding dimensionality requested from the provider.
    pub embedding_dims: usize,
    /// Completion model name.
    pub generation_model: String,
    /// API key for Gemini, when configured.
    pub gemini_api_key: Option<String>,
}

impl ModelConfig {
    /// Default model names and dimensions for `provider`.
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Gemini => Self {
                provider,
                embedding_model: "gemini-embedding-001".to_string(),
                embedding_dims: 768,
                generation_model: "gemini-2.0-flash".to_string(),
                gemini_api_key: None,
            },
            Provider::Ollama => Self {
                provider,
                embedding_model: "nomic-embed-text".to_string(),
                embedding_dims: 768,
                generation_model: "gemma3".to_string(),
                gemini_api_key: None,
            },
        }
    }

    /// Resolves model configuration from the environment.
    ///
    /// Recognized variables: `ASKDOCS_PROVIDER`, `ASKDOCS_EMBEDDING_MODEL`,
    /// `ASKDOCS_EMBEDDING_DIMS`, `ASKDOCS_GENERATION_MODEL`, and
    /// `GEMINI_API_KEY` (required when the provider is `gemini`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable fails to parse or a
    /// required key is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let provider = match env::var("ASKDOCS_PROVIDER") {
            Ok(raw) => Provider::parse(&raw).ok_or_else(|| ConfigError::EnvParse {
                key: "ASKDOCS_PROVIDER".to_string(),
                message: "must be 'gemini' or 'ollama'".to_string(),
            })?,
            Err(_) => Provider::Gemini,
        };

        let mut config = Self::for_provider(provider);
        if let Ok(model) = env::var("ASKDOCS_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Ok(dims) = env::var("ASKDOCS_EMBEDDING_DIMS") {
            config.embedding_dims = parse_usize("ASKDOCS_EMBEDDING_DIMS", &dims)?;
        }
        if let Ok(model) = env::var("ASKDOCS_GENERATION_MODEL") {
            config.generation_model = model;
        }
        config.gemini_api_key = env::var("GEMINI_API_KEY").ok();

        config.validate()?;
        Ok(config)
    }

    /// The Gemini API key, or [`ConfigError::MissingEnv`] when unset.
    pub fn require_gemini_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnv {
                key: "GEMINI_API_KEY".to_string(),
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding_dims == 0 {
            return Err(ConfigError::Invalid {
                field: "embedding_dims".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.provider == Provider::Gemini && self.gemini_api_key.is_none() {
            return Err(ConfigError::MissingEnv {
                key: "GEMINI_API_KEY".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::EnvParse {
            key: key.to_string(),
            message: "must be a non-negative integer".to_string(),
        })
}
