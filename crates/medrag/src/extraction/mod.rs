//! Text extraction from uploaded reports and chunking for indexing

mod chunker;
mod extractor;

pub use chunker::TextChunker;
pub use extractor::{PageText, TextExtractor};
