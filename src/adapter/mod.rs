//! Vector-store adapters.
//!
//! An [`Adapter`] bridges embedding output to one backend's ingestion API.
//! Backends are swapped by implementing the trait; the embedding pipeline
//! only ever sees `&dyn Adapter`.

mod memory;
mod pinecone;

pub use memory::{cosine_similarity, MemoryAdapter, SearchResult};
pub use pinecone::PineconeAdapter;

use crate::embedding::{EmbedData, FILE_NAME_KEY};
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use uuid::Uuid;

static PATH_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/|\\").unwrap());

/// Index creation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Index name.
    pub name: String,
    /// Vector dimensionality. Not validated locally.
    pub dimension: usize,
    /// Distance metric.
    pub metric: String,
    /// Serverless cloud provider.
    pub cloud: String,
    /// Serverless region.
    pub region: String,
}

impl IndexSpec {
    /// A cosine index named `anything` on AWS `us-east-1`.
    pub fn new(dimension: usize) -> Self {
        Self {
            name: "anything".to_string(),
            dimension,
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = metric.into();
        self
    }

    pub fn with_serverless(mut self, cloud: impl Into<String>, region: impl Into<String>) -> Self {
        self.cloud = cloud.into();
        self.region = region.into();
        self
    }
}

/// One vector ready to be upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertRecord {
    /// Freshly generated identifier.
    pub id: String,
    /// Embedding vector.
    pub values: Vec<f32>,
    /// `text` and `file` entries.
    pub metadata: BTreeMap<String, String>,
}

/// Trait for vector-store adapters.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Create an index and remember its name for later upserts.
    async fn create_index(&mut self, spec: IndexSpec) -> Result<()>;

    /// Delete an index. A missing index yields `IndexNotFound`.
    async fn delete_index(&self, index_name: &str) -> Result<()>;

    /// Convert embeddings to upsert records, one per input, in order.
    fn convert(&self, embeddings: &[EmbedData]) -> Vec<UpsertRecord>;

    /// Convert and send embeddings to the current index.
    async fn upsert(&self, data: &[EmbedData]) -> Result<()>;
}

/// Last path segment of `file_name`, splitting on `/` or `\`.
pub fn file_basename(file_name: &str) -> &str {
    PATH_SEPARATOR.split(file_name).last().unwrap_or("")
}

/// Build `{id, values, metadata: {text, file}}` records with random ids.
pub fn to_records(embeddings: &[EmbedData]) -> Vec<UpsertRecord> {
    embeddings
        .iter()
        .map(|data| {
            let file = file_basename(data.metadata_value(FILE_NAME_KEY).unwrap_or(""));
            let mut metadata = BTreeMap::new();
            metadata.insert("text".to_string(), data.text.clone().unwrap_or_default());
            metadata.insert("file".to_string(), file.to_string());

            UpsertRecord {
                id: Uuid::new_v4().to_string(),
                values: data.embedding.clone(),
                metadata,
            }
        })
        .collect()
}
