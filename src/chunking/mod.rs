//! Text chunking for embedding.
//!
//! Splits extracted document text into character-bounded chunks, preferring
//! semantic boundaries (paragraphs, sentences, words) over hard cuts.
//! [`SemanticChunker`] instead places boundaries where embeddings of
//! neighbouring sentences stop being similar.

mod semantic;

pub use semantic::{SemanticChunker, DEFAULT_WINDOW_SIZE};

use crate::error::{EmbedSyncError, Result};
use text_splitter::TextSplitter;
use tracing::debug;

/// Splits text into chunks of at most `chunk_size` characters.
pub struct TextChunker {
    chunk_size: usize,
    splitter: TextSplitter<text_splitter::Characters>,
}

impl TextChunker {
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(EmbedSyncError::InvalidInput(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            chunk_size,
            splitter: TextSplitter::new(chunk_size),
        })
    }

    /// Split text into ordered, non-blank chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chunks: Vec<String> = self
            .splitter
            .chunks(text)
            .filter(|chunk| !chunk.trim().is_empty())
            .map(str::to_string)
            .collect();

        debug!(
            "Split {} bytes into {} chunks (max {} chars)",
            text.len(),
            chunks.len(),
            self.chunk_size
        );

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_respect_size() {
        let chunker = TextChunker::new(100).unwrap();
        let text = "This is a test sentence. ".repeat(40);

        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
            assert!(!chunk.trim().is_empty());
        }
    }

    #[test]
    fn test_order_preserved() {
        let chunker = TextChunker::new(20).unwrap();
        let chunks = chunker.chunk("first part here. second part here. third part here.");
        let joined = chunks.join(" ");
        let first = joined.find("first").unwrap();
        let third = joined.find("third").unwrap();
        assert!(first < third);
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        let chunker = TextChunker::new(50).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\n  ").is_empty());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(TextChunker::new(0).is_err());
    }

    #[test]
    fn test_utf8_text() {
        let chunker = TextChunker::new(30).unwrap();
        let text = "acentuação: ã, õ, ç 🎮. ".repeat(10);
        let chunks = chunker.chunk(&text);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 30);
        }
    }
}
