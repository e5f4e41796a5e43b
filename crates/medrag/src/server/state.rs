//! Application state for the report Q&A server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::extraction::TextExtractor;
use crate::generation::AnswerEngine;
use crate::providers::{EmbeddingProvider, GroqClient, HuggingFaceEmbedder, LlmProvider};
use crate::retrieval::VectorIndex;
use crate::storage::{ReportStore, REPORTS_TABLE};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Extracted report records
    store: ReportStore,
    /// Text extraction for uploads
    extractor: TextExtractor,
    /// Retrieval + generation over the shared index
    engine: AnswerEngine,
}

impl AppState {
    /// Create application state backed by the hosted providers
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let store = ReportStore::open(&config.database)?;
        store.init()?;

        if store.table_exists(REPORTS_TABLE)? {
            tracing::info!("Table '{}' exists", REPORTS_TABLE);
        } else {
            tracing::warn!("Table '{}' does not exist", REPORTS_TABLE);
        }

        let embedder = Arc::new(HuggingFaceEmbedder::new(&config.embeddings)?);
        tracing::info!(
            "Embedding provider initialized ({} with {} dimensions)",
            config.embeddings.model,
            config.embeddings.dimensions
        );

        let llm = Arc::new(GroqClient::new(&config.llm)?);
        tracing::info!("LLM provider initialized ({})", config.llm.model);

        Self::from_parts(config, store, embedder, llm)
    }

    /// Assemble state from already-built components
    pub fn from_parts(
        config: RagConfig,
        store: ReportStore,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let index = Arc::new(VectorIndex::initialize(
            &config.storage.vectorstore_dir,
            embedder,
            &config.chunking,
        )?);
        tracing::info!("Vector index ready with {} chunks", index.len());

        let engine = AnswerEngine::new(index, llm, config.retrieval.top_k);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                extractor: TextExtractor::new(),
                engine,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the report store
    pub fn store(&self) -> &ReportStore {
        &self.inner.store
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.inner.extractor
    }

    /// Get the answer engine
    pub fn engine(&self) -> &AnswerEngine {
        &self.inner.engine
    }

    /// Get the vector index
    pub fn index(&self) -> &Arc<VectorIndex> {
        self.inner.engine.index()
    }
}
