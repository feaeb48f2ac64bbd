//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{EmbedSyncError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI limits the number of inputs per embedding request.
const MAX_INPUTS_PER_REQUEST: usize = 100;

/// Native dimensionality of a known OpenAI embedding model.
pub fn native_dimensions(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        "text-embedding-ada-002" => Some(1536),
        _ => None,
    }
}

/// Only the v3 models accept a `dimensions` parameter.
fn supports_shortening(model: &str) -> bool {
    model.starts_with("text-embedding-3")
}

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl std::fmt::Debug for OpenAIEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIEmbedder")
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl OpenAIEmbedder {
    /// Create an embedder for a known model at its native dimensionality.
    pub fn new(model: &str) -> Result<Self> {
        let dimensions = native_dimensions(model).ok_or_else(|| {
            EmbedSyncError::InvalidInput(format!("Unknown OpenAI embedding model: {}", model))
        })?;
        Self::with_config(
            model,
            dimensions,
            Duration::from_secs(crate::openai::DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create an embedder with custom model, dimensions and request timeout.
    pub fn with_config(model: &str, dimensions: usize, timeout: Duration) -> Result<Self> {
        if let Some(native) = native_dimensions(model) {
            if dimensions != native && !supports_shortening(model) {
                return Err(EmbedSyncError::InvalidInput(format!(
                    "{} only produces {}-dimensional embeddings",
                    model, native
                )));
            }
        }

        Ok(Self {
            client: create_client_with_timeout(timeout)?,
            model: model.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, texts), fields(count = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(MAX_INPUTS_PER_REQUEST) {
            let mut args = CreateEmbeddingRequestArgs::default();
            args.model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()));
            if supports_shortening(&self.model) {
                args.dimensions(self.dimensions as u32);
            }
            let request = args.build().map_err(|e| {
                EmbedSyncError::Embedding(format!("Failed to build request: {}", e))
            })?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| EmbedSyncError::OpenAI(format!("Embedding API error: {}", e)))?;

            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            if embeddings.len() != chunk.len() {
                return Err(EmbedSyncError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    embeddings.len()
                )));
            }

            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OpenAIEmbedder::new("text-embedding-3-small").unwrap();
        assert_eq!(embedder.dimensions(), 1536);
        assert_eq!(embedder.model_id(), "text-embedding-3-small");

        let embedder =
            OpenAIEmbedder::with_config("text-embedding-3-large", 256, Duration::from_secs(5))
                .unwrap();
        assert_eq!(embedder.dimensions(), 256);
    }

    #[test]
    fn test_unknown_model_rejected() {
        let result = OpenAIEmbedder::new("sentence-transformers/all-MiniLM-L6-v2");
        assert!(matches!(result, Err(EmbedSyncError::InvalidInput(_))));
    }

    #[test]
    fn test_ada_cannot_be_shortened() {
        let result =
            OpenAIEmbedder::with_config("text-embedding-ada-002", 384, Duration::from_secs(5));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let embedder = OpenAIEmbedder::new("text-embedding-3-small").unwrap();
        let embeddings = embedder.embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }
}
