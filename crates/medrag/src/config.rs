//! Configuration for the report Q&A service
//!
//! Defaults live in the `Default` impls; [`RagConfig::from_env`] layers the
//! process environment on top and enforces the required keys.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Local directories for raw uploads and the vector index
    pub storage: StorageConfig,
    /// Report database configuration
    pub database: DatabaseConfig,
    /// Embedding provider configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Generative model configuration
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:8501".to_string()],
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Local storage directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Raw uploaded files, keyed by original filename
    pub data_dir: PathBuf,
    /// Persisted vector index
    pub vectorstore_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            vectorstore_dir: PathBuf::from("vectorstore"),
        }
    }
}

/// Report database configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string (`sqlite://path`, `sqlite:path`, a bare path or `:memory:`)
    pub url: String,
}

impl DatabaseConfig {
    /// Resolve the connection string to a SQLite location
    pub fn sqlite_path(&self) -> Result<String> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::Config("DATABASE_URL is empty".to_string()));
        }

        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);

        if path.contains("://") {
            return Err(Error::Config(format!(
                "Unsupported database URL scheme: {}",
                url.split("://").next().unwrap_or_default()
            )));
        }

        Ok(path.to_string())
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Inference API base URL (the model id is appended)
    pub base_url: String,
    /// Model to use
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Texts per embedding request
    pub batch_size: usize,
    /// API token
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.huggingface.co/hf-inference/models".to_string(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// API key
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the model per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

impl RagConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} must be set", key)))
        };

        let mut config = Self::default();

        config.database.url = required("DATABASE_URL")?;
        config.llm.api_key = required("GROQ_API_KEY")?;
        config.embeddings.api_key = required("HUGGINGFACEHUB_API_TOKEN")?;

        if let Some(host) = lookup("MEDRAG_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("MEDRAG_PORT") {
            config.server.port = parse_number("MEDRAG_PORT", &port)?;
        }
        if let Some(origins) = lookup("MEDRAG_CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(dir) = lookup("MEDRAG_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("MEDRAG_VECTORSTORE_DIR") {
            config.storage.vectorstore_dir = PathBuf::from(dir);
        }
        if let Some(model) = lookup("GROQ_MODEL") {
            config.llm.model = model;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            config.embeddings.model = model;
        }
        if let Some(top_k) = lookup("RETRIEVAL_TOP_K") {
            config.retrieval.top_k = parse_number("RETRIEVAL_TOP_K", &top_k)?;
        }

        // Validate early so a bad scheme is a startup failure
        config.database.sqlite_path()?;

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a valid number: {}", key, value)))
}
