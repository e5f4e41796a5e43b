//! medrag: question answering over uploaded medical reports
//!
//! Uploaded PDFs and images are reduced to text (lopdf / tesseract), stored
//! as report records in SQLite, chunked and embedded into a persisted
//! vector index, and questions are answered by a hosted LLM over the
//! retrieved chunks.

pub mod config;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{Chunk, ChunkSource, Report};
