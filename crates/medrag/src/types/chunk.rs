//! Chunk types with source tracking

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// File kinds the extractor understands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// PDF document (text layer)
    Pdf,
    /// Raster image - requires tesseract
    Image,
    /// Anything else
    Unsupported,
}

impl FileKind {
    /// Detect file kind from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "png" | "jpg" | "jpeg" => Self::Image,
            _ => Self::Unsupported,
        }
    }

    /// Detect file kind from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unsupported)
    }
}

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkSource {
    /// Original filename as uploaded
    pub filename: String,
    /// Page number (1-indexed)
    pub page_number: Option<u32>,
}

impl ChunkSource {
    /// Source info for a page of a file
    pub fn page(filename: impl Into<String>, page_number: u32) -> Self {
        Self {
            filename: filename.into(),
            page_number: Some(page_number),
        }
    }
}

/// A bounded-length slice of a report's text, with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Text content of the chunk
    pub content: String,
    /// Source information
    pub source: ChunkSource,
    /// Position among the chunks of its file
    pub chunk_index: u32,
    /// Embedding vector (empty until embedded)
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Create a new chunk without an embedding
    pub fn new(content: String, source: ChunkSource, chunk_index: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            source,
            chunk_index,
            embedding: Vec::new(),
        }
    }
}
