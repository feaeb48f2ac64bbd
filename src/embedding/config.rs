//! Chunking and batching configuration for text embedding.

use crate::config::{SplittingStrategy, TextEmbedSettings};
use crate::error::{EmbedSyncError, Result};

/// Controls how files are chunked, batched and streamed to an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEmbedConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of chunks sent to the embedder per call.
    pub batch_size: usize,
    /// Number of embeddings buffered before each adapter upsert.
    pub buffer_size: usize,
    /// How file text is split before embedding.
    pub splitting_strategy: SplittingStrategy,
}

impl Default for TextEmbedConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            batch_size: 32,
            buffer_size: 100,
            splitting_strategy: SplittingStrategy::Sentence,
        }
    }
}

impl TextEmbedConfig {
    pub fn new(chunk_size: usize, batch_size: usize) -> Self {
        Self {
            chunk_size,
            batch_size,
            ..Self::default()
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_splitting_strategy(mut self, strategy: SplittingStrategy) -> Self {
        self.splitting_strategy = strategy;
        self
    }

    /// Reject zero sizes, which would stall the chunker or the batch loop.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("chunk_size", self.chunk_size),
            ("batch_size", self.batch_size),
            ("buffer_size", self.buffer_size),
        ] {
            if value == 0 {
                return Err(EmbedSyncError::InvalidInput(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl From<&TextEmbedSettings> for TextEmbedConfig {
    fn from(settings: &TextEmbedSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            batch_size: settings.batch_size,
            buffer_size: settings.buffer_size,
            splitting_strategy: settings.splitting_strategy,
        }
    }
}
