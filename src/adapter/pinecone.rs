//! Pinecone adapter.

use super::{to_records, Adapter, IndexSpec, UpsertRecord};
use crate::embedding::EmbedData;
use crate::error::{EmbedSyncError, Result};
use crate::pinecone::{CreateIndexRequest, ListOptions, ListResponse, PineconeApi, PineconeClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Streams embeddings into a Pinecone index.
///
/// Holds no state beyond the client handle, the name of the index created
/// last, and an optional namespace.
pub struct PineconeAdapter<C: PineconeApi = PineconeClient> {
    client: C,
    index_name: Option<String>,
    namespace: Option<String>,
}

impl<C: PineconeApi> PineconeAdapter<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            index_name: None,
            namespace: None,
        }
    }

    /// Use a namespace for upserts and listings.
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    /// Target an index that already exists, without creating it.
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Name of the current index, set by `create_index`.
    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn require_index(&self) -> Result<&str> {
        self.index_name.as_deref().ok_or_else(|| {
            EmbedSyncError::InvalidState("Index must be created before upserting data".to_string())
        })
    }

    /// List one page of record ids from the current index.
    #[instrument(skip(self, options))]
    pub async fn list_paginated(&self, options: ListOptions) -> Result<ListResponse> {
        let index_name = self.require_index()?;
        let options = ListOptions {
            namespace: options.namespace.or_else(|| self.namespace.clone()),
            ..options
        };
        self.client.list_paginated(index_name, &options).await
    }
}

#[async_trait]
impl<C: PineconeApi> Adapter for PineconeAdapter<C> {
    #[instrument(skip(self, spec), fields(index = %spec.name))]
    async fn create_index(&mut self, spec: IndexSpec) -> Result<()> {
        self.index_name = Some(spec.name.clone());
        let model = self
            .client
            .create_index(&CreateIndexRequest::from(&spec))
            .await?;
        info!("Index {} ready at {}", model.name, model.host);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index_name: &str) -> Result<()> {
        self.client.delete_index(index_name).await
    }

    fn convert(&self, embeddings: &[EmbedData]) -> Vec<UpsertRecord> {
        to_records(embeddings)
    }

    #[instrument(skip(self, data), fields(count = data.len()))]
    async fn upsert(&self, data: &[EmbedData]) -> Result<()> {
        let records = self.convert(data);
        let index_name = self.require_index()?;

        let response = self
            .client
            .upsert(index_name, &records, self.namespace.as_deref())
            .await?;
        debug!(
            "Sent {} records to {}, {} upserted",
            records.len(),
            index_name,
            response.upserted_count
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::FILE_NAME_KEY;
    use crate::pinecone::{IndexModel, IndexStatus, ListItem, UpsertResponse};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(String, usize),
        Delete(String),
        Upsert(String, Vec<UpsertRecord>, Option<String>),
        List(String, ListOptions),
    }

    /// Records calls instead of talking to Pinecone.
    #[derive(Default)]
    struct FakeApi {
        calls: Mutex<Vec<Call>>,
        existing: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn upserts(&self) -> Vec<Vec<UpsertRecord>> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Upsert(_, records, _) => Some(records),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl PineconeApi for FakeApi {
        async fn create_index(&self, request: &CreateIndexRequest) -> Result<IndexModel> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Create(request.name.clone(), request.dimension));
            self.existing.lock().unwrap().push(request.name.clone());
            Ok(IndexModel {
                name: request.name.clone(),
                dimension: Some(request.dimension),
                metric: Some(request.metric.clone()),
                host: format!("{}.svc.test", request.name),
                status: IndexStatus {
                    ready: true,
                    state: "Ready".to_string(),
                },
            })
        }

        async fn delete_index(&self, name: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Delete(name.to_string()));
            let mut existing = self.existing.lock().unwrap();
            match existing.iter().position(|n| n == name) {
                Some(pos) => {
                    existing.remove(pos);
                    Ok(())
                }
                None => Err(EmbedSyncError::IndexNotFound(name.to_string())),
            }
        }

        async fn describe_index(&self, name: &str) -> Result<IndexModel> {
            Err(EmbedSyncError::IndexNotFound(name.to_string()))
        }

        async fn upsert(
            &self,
            index_name: &str,
            vectors: &[UpsertRecord],
            namespace: Option<&str>,
        ) -> Result<UpsertResponse> {
            self.calls.lock().unwrap().push(Call::Upsert(
                index_name.to_string(),
                vectors.to_vec(),
                namespace.map(str::to_string),
            ));
            Ok(UpsertResponse {
                upserted_count: vectors.len(),
            })
        }

        async fn list_paginated(
            &self,
            index_name: &str,
            options: &ListOptions,
        ) -> Result<ListResponse> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::List(index_name.to_string(), options.clone()));
            Ok(ListResponse {
                vectors: vec![ListItem {
                    id: "a".to_string(),
                }],
                ..ListResponse::default()
            })
        }
    }

    fn sample() -> Vec<EmbedData> {
        vec![
            EmbedData::new(
                vec![0.1, 0.2],
                Some("Hello world".to_string()),
                Some(HashMap::from([(
                    FILE_NAME_KEY.to_string(),
                    "dir/test.pdf".to_string(),
                )])),
            ),
            EmbedData::new(
                vec![0.3, 0.4],
                Some("Hi".to_string()),
                Some(HashMap::from([(
                    FILE_NAME_KEY.to_string(),
                    r"C:\files\other.pdf".to_string(),
                )])),
            ),
        ]
    }

    #[tokio::test]
    async fn test_upsert_before_create_fails_without_remote_call() {
        let adapter = PineconeAdapter::new(FakeApi::default());

        let err = adapter.upsert(&sample()).await.unwrap_err();
        assert!(matches!(err, EmbedSyncError::InvalidState(_)));
        assert!(err.to_string().contains("Index must be created before upserting data"));
        assert!(adapter.client().calls().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_after_create_sends_once() {
        let mut adapter = PineconeAdapter::new(FakeApi::default());
        adapter.create_index(IndexSpec::new(2)).await.unwrap();
        assert_eq!(adapter.index_name(), Some("anything"));

        adapter.upsert(&sample()).await.unwrap();

        let upserts = adapter.client().upserts();
        assert_eq!(upserts.len(), 1);
        let records = &upserts[0];
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].values, vec![0.1, 0.2]);
        assert_eq!(records[0].metadata["file"], "test.pdf");
        assert_eq!(records[0].metadata["text"], "Hello world");
        assert_eq!(records[1].metadata["file"], "other.pdf");

        match &adapter.client().calls()[1] {
            Call::Upsert(index, _, namespace) => {
                assert_eq!(index, "anything");
                assert_eq!(namespace, &None);
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_index_passes_spec() {
        let mut adapter = PineconeAdapter::new(FakeApi::default());
        adapter
            .create_index(IndexSpec::new(384).with_name("docs"))
            .await
            .unwrap();

        assert_eq!(adapter.index_name(), Some("docs"));
        assert_eq!(adapter.client().calls(), vec![Call::Create("docs".to_string(), 384)]);
    }

    #[tokio::test]
    async fn test_delete_missing_index_is_typed() {
        let adapter = PineconeAdapter::new(FakeApi::default());
        let err = adapter.delete_index("anything").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_keeps_index_name() {
        let mut adapter = PineconeAdapter::new(FakeApi::default());
        adapter.create_index(IndexSpec::new(2)).await.unwrap();
        adapter.delete_index("anything").await.unwrap();

        // The stored name survives deletion; callers recreate before upserting.
        assert_eq!(adapter.index_name(), Some("anything"));
    }

    #[tokio::test]
    async fn test_namespace_applied() {
        let mut adapter =
            PineconeAdapter::new(FakeApi::default()).with_namespace(Some("docs".to_string()));
        adapter.create_index(IndexSpec::new(2)).await.unwrap();
        adapter.upsert(&sample()).await.unwrap();
        adapter.list_paginated(ListOptions::default()).await.unwrap();

        let calls = adapter.client().calls();
        assert!(matches!(&calls[1], Call::Upsert(_, _, Some(ns)) if ns == "docs"));
        assert!(matches!(&calls[2], Call::List(_, opts) if opts.namespace.as_deref() == Some("docs")));
    }

    #[tokio::test]
    async fn test_empty_namespace_means_default() {
        let adapter = PineconeAdapter::new(FakeApi::default())
            .with_namespace(Some(String::new()))
            .with_index("anything");
        adapter.upsert(&sample()).await.unwrap();
        assert!(matches!(&adapter.client().calls()[0], Call::Upsert(_, _, None)));
    }

    #[tokio::test]
    async fn test_list_requires_index() {
        let adapter = PineconeAdapter::new(FakeApi::default());
        let err = adapter.list_paginated(ListOptions::default()).await.unwrap_err();
        assert!(matches!(err, EmbedSyncError::InvalidState(_)));

        let adapter = adapter.with_index("existing");
        let page = adapter
            .list_paginated(ListOptions {
                limit: Some(10),
                ..ListOptions::default()
            })
            .await
            .unwrap();
        assert_eq!(page.vectors.len(), 1);
    }

    #[test]
    fn test_convert_end_to_end_scenario() {
        let adapter = PineconeAdapter::new(FakeApi::default());
        let input = vec![EmbedData::new(
            vec![0.1, 0.2],
            Some("Hello world".to_string()),
            Some(HashMap::from([(FILE_NAME_KEY.to_string(), "dir/test.pdf".to_string())])),
        )];

        let records = adapter.convert(&input);
        assert_eq!(records.len(), 1);
        assert!(uuid::Uuid::parse_str(&records[0].id).is_ok());
        assert_eq!(records[0].values, vec![0.1, 0.2]);
        assert_eq!(records[0].metadata["text"], "Hello world");
        assert_eq!(records[0].metadata["file"], "test.pdf");

        let again = adapter.convert(&input);
        assert_ne!(records[0].id, again[0].id);
    }
}
