//! Recursive character chunking with overlap

use std::collections::VecDeque;
use unicode_segmentation::UnicodeSegmentation;

use super::extractor::PageText;
use crate::types::{Chunk, ChunkSource};

/// Separators tried in order, coarsest first
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Text chunker with configurable size and overlap.
///
/// Sizes are counted in characters. Text is split on the coarsest separator
/// it contains; oversized pieces are split again with the next separator,
/// and pieces are then merged back into chunks of at most `chunk_size`
/// characters, each starting with up to `overlap` characters of the
/// previous chunk's tail.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Chunk every page of a file, numbering chunks across pages
    pub fn chunk_pages(&self, filename: &str, pages: &[PageText]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            for content in self.split_text(&page.text) {
                let index = chunks.len() as u32;
                chunks.push(Chunk::new(
                    content,
                    ChunkSource::page(filename, page.page_number),
                    index,
                ));
            }
        }

        chunks
    }

    /// Split text into overlapping chunks
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // First separator present in the text; "" always matches
        let position = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.graphemes(true).collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) <= self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }

            if finer.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }

        chunks.retain(|c| !c.trim().is_empty());
        chunks
    }

    /// Merge small pieces into chunks, carrying the overlap forward
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if current.is_empty() { 0 } else { separator_len };

            if total + len + joiner > self.chunk_size && !current.is_empty() {
                if let Some(chunk) = join(&current, separator) {
                    chunks.push(chunk);
                }

                // Drop from the front until only the overlap remains and the next piece fits
                while total > self.overlap
                    || (total > 0 && total + len + separator_len > self.chunk_size)
                {
                    let had_joiner = current.len() > 1;
                    match current.pop_front() {
                        Some(first) => {
                            total -= char_len(first) + if had_joiner { separator_len } else { 0 };
                        }
                        None => break,
                    }
                }
            }

            total += len + if current.is_empty() { 0 } else { separator_len };
            current.push_back(piece);
        }

        if let Some(chunk) = join(&current, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

fn join(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = TextChunker::default();
        let chunks = chunker.split_text("blood pressure: 120/80");
        assert_eq!(chunks, vec!["blood pressure: 120/80".to_string()]);
    }

    #[test]
    fn test_chunks_respect_size() {
        let chunker = TextChunker::new(500, 50);
        let text = words(400);
        let chunks = chunker.split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 500, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.split_text(&words(100));

        for pair in chunks.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(
                pair[0].split(' ').any(|w| w == first_word),
                "'{}' does not start inside the previous chunk",
                first_word
            );
        }
    }

    #[test]
    fn test_paragraphs_split_before_words() {
        let chunker = TextChunker::new(40, 0);
        let text = "Patient: Jane Doe\n\nDiagnosis: hypertension stage one\n\nPlan: follow up";
        let chunks = chunker.split_text(text);

        assert_eq!(chunks[0], "Patient: Jane Doe");
        assert!(chunks.iter().any(|c| c.starts_with("Diagnosis")));
    }

    #[test]
    fn test_unbroken_text_falls_back_to_characters() {
        let chunker = TextChunker::new(10, 2);
        let chunks = chunker.split_text(&"x".repeat(35));

        assert!(chunks.len() >= 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_chunk_pages_tracks_source() {
        let chunker = TextChunker::new(30, 5);
        let pages = vec![
            PageText { page_number: 1, text: "hemoglobin 13.5 g/dL within range".to_string() },
            PageText { page_number: 2, text: "platelets 250".to_string() },
        ];
        let chunks = chunker.chunk_pages("cbc.pdf", &pages);

        let last = chunks.last().unwrap();
        assert_eq!(last.source, ChunkSource::page("cbc.pdf", 2));
        assert_eq!(last.chunk_index as usize, chunks.len() - 1);
        assert!(chunks.iter().all(|c| c.embedding.is_empty()));
    }
}
