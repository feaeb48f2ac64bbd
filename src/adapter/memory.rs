//! In-memory adapter.
//!
//! Useful for testing and for running the pipeline without a hosted
//! vector database.

use super::{to_records, Adapter, IndexSpec, UpsertRecord};
use crate::embedding::EmbedData;
use crate::error::{EmbedSyncError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A stored record with its similarity to a query.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub record: UpsertRecord,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

#[derive(Debug, Default)]
struct Index {
    dimension: usize,
    records: HashMap<String, UpsertRecord>,
}

/// In-memory adapter holding any number of named indexes.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    indexes: RwLock<HashMap<String, Index>>,
    index_name: Option<String>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    fn require_index(&self) -> Result<&str> {
        self.index_name.as_deref().ok_or_else(|| {
            EmbedSyncError::InvalidState("Index must be created before upserting data".to_string())
        })
    }

    /// Number of records in the current index.
    pub async fn len(&self) -> Result<usize> {
        let name = self.require_index()?;
        let indexes = self.indexes.read().await;
        indexes
            .get(name)
            .map(|index| index.records.len())
            .ok_or_else(|| EmbedSyncError::IndexNotFound(name.to_string()))
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Most similar records in the current index.
    pub async fn search(&self, query: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let name = self.require_index()?;
        let indexes = self.indexes.read().await;
        let index = indexes
            .get(name)
            .ok_or_else(|| EmbedSyncError::IndexNotFound(name.to_string()))?;

        let mut results: Vec<SearchResult> = index
            .records
            .values()
            .map(|record| SearchResult {
                score: cosine_similarity(query, &record.values),
                record: record.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn create_index(&mut self, spec: IndexSpec) -> Result<()> {
        self.index_name = Some(spec.name.clone());
        let mut indexes = self.indexes.write().await;
        if indexes.contains_key(&spec.name) {
            return Err(EmbedSyncError::InvalidInput(format!(
                "Index {} already exists",
                spec.name
            )));
        }
        indexes.insert(
            spec.name,
            Index {
                dimension: spec.dimension,
                records: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_index(&self, index_name: &str) -> Result<()> {
        self.indexes
            .write()
            .await
            .remove(index_name)
            .map(|_| ())
            .ok_or_else(|| EmbedSyncError::IndexNotFound(index_name.to_string()))
    }

    fn convert(&self, embeddings: &[EmbedData]) -> Vec<UpsertRecord> {
        to_records(embeddings)
    }

    async fn upsert(&self, data: &[EmbedData]) -> Result<()> {
        let records = self.convert(data);
        let name = self.require_index()?;

        let mut indexes = self.indexes.write().await;
        let index = indexes
            .get_mut(name)
            .ok_or_else(|| EmbedSyncError::IndexNotFound(name.to_string()))?;

        if let Some(bad) = records.iter().find(|r| r.values.len() != index.dimension) {
            return Err(EmbedSyncError::InvalidInput(format!(
                "Vector dimension {} does not match index dimension {}",
                bad.values.len(),
                index.dimension
            )));
        }

        for record in records {
            index.records.insert(record.id.clone(), record);
        }
        Ok(())
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::FILE_NAME_KEY;
    use tokio_test::{assert_err, assert_ok};

    fn data(values: Vec<f32>, text: &str) -> EmbedData {
        EmbedData::new(
            values,
            Some(text.to_string()),
            Some(HashMap::from([(FILE_NAME_KEY.to_string(), "docs/a.txt".to_string())])),
        )
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_memory_adapter_roundtrip() {
        let mut adapter = MemoryAdapter::new();
        adapter.create_index(IndexSpec::new(3)).await.unwrap();

        adapter
            .upsert(&[
                data(vec![1.0, 0.0, 0.0], "Hello world"),
                data(vec![0.0, 1.0, 0.0], "Goodbye world"),
            ])
            .await
            .unwrap();

        assert_eq!(adapter.len().await.unwrap(), 2);

        let results = adapter.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].record.metadata["text"], "Hello world");
        assert_eq!(results[0].record.metadata["file"], "a.txt");
    }

    #[tokio::test]
    async fn test_upsert_requires_index() {
        let adapter = MemoryAdapter::new();
        let err = assert_err!(adapter.upsert(&[data(vec![1.0], "x")]).await);
        assert!(matches!(err, EmbedSyncError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let mut adapter = MemoryAdapter::new();
        adapter.create_index(IndexSpec::new(2)).await.unwrap();
        let err = adapter.upsert(&[data(vec![1.0, 0.0, 0.0], "x")]).await.unwrap_err();
        assert!(matches!(err, EmbedSyncError::InvalidInput(_)));
        assert!(adapter.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_and_recreate() {
        let mut adapter = MemoryAdapter::new();
        assert!(adapter.delete_index("anything").await.unwrap_err().is_not_found());

        adapter.create_index(IndexSpec::new(1)).await.unwrap();
        adapter.upsert(&[data(vec![1.0], "x")]).await.unwrap();
        adapter.delete_index("anything").await.unwrap();
        assert!(adapter.len().await.unwrap_err().is_not_found());

        adapter.create_index(IndexSpec::new(1)).await.unwrap();
        assert_eq!(adapter.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let mut adapter = MemoryAdapter::new();
        assert_ok!(adapter.create_index(IndexSpec::new(1)).await);
        assert_err!(adapter.create_index(IndexSpec::new(1)).await);
    }
}
