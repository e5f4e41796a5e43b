//! Core types for the report Q&A service

pub mod api;
pub mod chunk;
pub mod report;

pub use api::{ChatRequest, ChatResponse, MessageResponse, UploadResponse};
pub use chunk::{Chunk, ChunkSource, FileKind};
pub use report::Report;
