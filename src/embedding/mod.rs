//! Embedding generation and the data it produces.

mod config;
mod openai;
mod trigram;

pub use config::TextEmbedConfig;
pub use openai::{native_dimensions, OpenAIEmbedder};
pub use trigram::{TrigramEmbedder, DEFAULT_TRIGRAM_DIMENSIONS};

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::{EmbedSyncError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Metadata key holding the source file path of a chunk.
pub const FILE_NAME_KEY: &str = "file_name";

/// One embedded chunk of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedData {
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Source text of the chunk.
    pub text: Option<String>,
    /// Source metadata, e.g. `file_name`.
    pub metadata: Option<HashMap<String, String>>,
}

impl EmbedData {
    pub fn new(
        embedding: Vec<f32>,
        text: Option<String>,
        metadata: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            embedding,
            text,
            metadata,
        }
    }

    /// Look up a metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }
}

impl std::fmt::Display for EmbedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EmbedData(embedding: {:?}, text: {:?}, metadata: {:?})",
            self.embedding, self.text, self.metadata
        )
    }
}

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedSyncError::Embedding("Empty embedding response".to_string()))
    }

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Identifier of the underlying model.
    fn model_id(&self) -> &str;
}

/// Model families that can be loaded by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhichModel {
    OpenAI,
    Trigram,
}

impl From<EmbeddingProvider> for WhichModel {
    fn from(provider: EmbeddingProvider) -> Self {
        match provider {
            EmbeddingProvider::OpenAI => WhichModel::OpenAI,
            EmbeddingProvider::Trigram => WhichModel::Trigram,
        }
    }
}

/// A loaded embedding model.
#[derive(Clone)]
pub struct EmbeddingModel {
    which: WhichModel,
    inner: Arc<dyn Embedder>,
}

impl std::fmt::Debug for EmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingModel")
            .field("which", &self.which)
            .field("model_id", &self.inner.model_id())
            .field("dimensions", &self.inner.dimensions())
            .finish()
    }
}

impl EmbeddingModel {
    /// Load a model by its pretrained identifier at its native dimensionality.
    pub fn from_pretrained(which: WhichModel, model_id: &str) -> Result<Self> {
        let inner: Arc<dyn Embedder> = match which {
            WhichModel::OpenAI => Arc::new(OpenAIEmbedder::new(model_id)?),
            WhichModel::Trigram => Arc::new(TrigramEmbedder::with_model_id(
                model_id,
                DEFAULT_TRIGRAM_DIMENSIONS,
            )),
        };
        Ok(Self { which, inner })
    }

    /// Rebuild the model producing vectors of `dimensions` entries.
    pub fn with_dimensions(self, dimensions: usize) -> Result<Self> {
        Self::build(
            self.which,
            self.inner.model_id(),
            dimensions,
            Duration::from_secs(crate::openai::DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Build the model described by the `[embedding]` settings.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        Self::build(
            settings.provider.into(),
            &settings.model,
            settings.dimensions as usize,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    fn build(
        which: WhichModel,
        model_id: &str,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self> {
        if dimensions == 0 {
            return Err(EmbedSyncError::InvalidInput(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }
        let inner: Arc<dyn Embedder> = match which {
            WhichModel::OpenAI => {
                Arc::new(OpenAIEmbedder::with_config(model_id, dimensions, timeout)?)
            }
            WhichModel::Trigram => Arc::new(TrigramEmbedder::with_model_id(model_id, dimensions)),
        };
        Ok(Self { which, inner })
    }

    pub fn which(&self) -> WhichModel {
        self.which
    }
}

#[async_trait]
impl Embedder for EmbeddingModel {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.inner.embed_batch(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
