//! Provider abstractions for embeddings and answer generation
//!
//! Hosted APIs sit behind traits so the index and answer engine can run
//! against deterministic doubles in tests.

pub mod embedding;
pub mod groq;
pub mod huggingface;
pub mod llm;

pub use embedding::EmbeddingProvider;
pub use groq::GroqClient;
pub use huggingface::HuggingFaceEmbedder;
pub use llm::LlmProvider;
