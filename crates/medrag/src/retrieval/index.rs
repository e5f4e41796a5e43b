//! Persisted flat vector index over report chunks

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::extraction::{PageText, TextChunker, TextExtractor};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

/// File name of the persisted index inside the vectorstore directory
pub const INDEX_FILE: &str = "index.json";

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity (higher is better)
    pub similarity: f32,
}

/// On-disk layout
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    model: String,
    dimensions: usize,
    chunks: Vec<Chunk>,
}

/// Append-only embedding index with brute-force cosine search
pub struct VectorIndex {
    path: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: TextExtractor,
    chunker: TextChunker,
    chunks: RwLock<Vec<Chunk>>,
    /// Serialises snapshot writes so an older snapshot never lands last
    persist_lock: Mutex<()>,
}

impl VectorIndex {
    /// Load the index from `dir`, or create and persist an empty one
    pub fn initialize(
        dir: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        chunking: &ChunkingConfig,
    ) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(INDEX_FILE);

        let chunks = if path.exists() {
            let persisted: PersistedIndex = serde_json::from_slice(&std::fs::read(&path)?)?;

            if persisted.model != embedder.model() || persisted.dimensions != embedder.dimensions() {
                return Err(Error::vector_index(format!(
                    "Index at {} was built with {} ({} dimensions) but the embedder is {} ({} dimensions)",
                    path.display(),
                    persisted.model,
                    persisted.dimensions,
                    embedder.model(),
                    embedder.dimensions()
                )));
            }

            tracing::info!(
                "Loaded vector index with {} chunks from {}",
                persisted.chunks.len(),
                path.display()
            );
            persisted.chunks
        } else {
            tracing::info!("Creating new vector index at {}", path.display());
            Vec::new()
        };

        let index = Self {
            path,
            embedder,
            extractor: TextExtractor::new(),
            chunker: TextChunker::new(chunking.chunk_size, chunking.chunk_overlap),
            chunks: RwLock::new(chunks),
            persist_lock: Mutex::new(()),
        };

        if !index.path.exists() {
            index.persist()?;
        }

        Ok(index)
    }

    /// Extract, chunk, embed and append a file; returns the number of chunks added
    pub async fn add(&self, path: &Path) -> Result<usize> {
        let extractor = self.extractor.clone();
        let owned = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || extractor.load_pages(&owned)).await??;

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        self.add_pages(&source, &pages).await
    }

    /// Chunk, embed and append already-extracted pages
    pub async fn add_pages(&self, source: &str, pages: &[PageText]) -> Result<usize> {
        let mut chunks = self.chunker.chunk_pages(source, pages);
        if chunks.is_empty() {
            tracing::warn!("No text to index for {}", source);
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            tracing::error!("Embedding {} chunks from {} failed: {}", texts.len(), source, e);
            e
        })?;

        if embeddings.len() != chunks.len() {
            return Err(Error::vector_index(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimensions = self.embedder.dimensions();
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            if embedding.len() != dimensions {
                return Err(Error::vector_index(format!(
                    "Embedding has {} dimensions, index expects {}",
                    embedding.len(),
                    dimensions
                )));
            }
            chunk.embedding = embedding;
        }

        let added = chunks.len();
        self.chunks.write().extend(chunks);
        self.persist()?;

        tracing::info!("Indexed {} chunks from {} ({} total)", added, source, self.len());
        Ok(added)
    }

    /// Rank every chunk by cosine similarity to the query
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let chunks = self.chunks.read();
        let mut results: Vec<SearchResult> = chunks
            .iter()
            .map(|chunk| SearchResult {
                similarity: cosine_similarity(&query_embedding, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    /// Write a snapshot to a temporary file and rename it over the index
    fn persist(&self) -> Result<()> {
        let _guard = self.persist_lock.lock();

        let bytes = {
            let chunks = self.chunks.read();
            serde_json::to_vec(&PersistedIndexRef {
                model: self.embedder.model(),
                dimensions: self.embedder.dimensions(),
                chunks: &chunks,
            })?
        };

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!("Persisted vector index to {}", self.path.display());
        Ok(())
    }
}

/// Borrowing twin of [`PersistedIndex`] for serialisation
#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    model: &'a str,
    dimensions: usize,
    chunks: &'a [Chunk],
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
