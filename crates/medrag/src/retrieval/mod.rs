//! Chunk embedding index and similarity search

mod index;

pub use index::{SearchResult, VectorIndex, INDEX_FILE};
