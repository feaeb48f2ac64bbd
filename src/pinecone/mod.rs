//! Pinecone REST API contract and client.
//!
//! [`PineconeApi`] is the narrow surface the adapter needs: index lifecycle
//! on the control plane, upsert and listing on an index's data plane.

mod client;

pub use client::PineconeClient;

use crate::adapter::{IndexSpec, UpsertRecord};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of `POST /indexes`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIndexRequest {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub spec: ServerlessSpecWrapper,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerlessSpecWrapper {
    pub serverless: ServerlessSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerlessSpec {
    pub cloud: String,
    pub region: String,
}

impl From<&IndexSpec> for CreateIndexRequest {
    fn from(spec: &IndexSpec) -> Self {
        Self {
            name: spec.name.clone(),
            dimension: spec.dimension,
            metric: spec.metric.clone(),
            spec: ServerlessSpecWrapper {
                serverless: ServerlessSpec {
                    cloud: spec.cloud.clone(),
                    region: spec.region.clone(),
                },
            },
        }
    }
}

/// Index description returned by the control plane.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IndexModel {
    pub name: String,
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub metric: Option<String>,
    /// Data plane host, without scheme.
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

/// Body of `POST /vectors/upsert`.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertRequest<'a> {
    pub vectors: &'a [UpsertRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<&'a str>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    #[serde(default)]
    pub upserted_count: usize,
}

/// Query parameters of `GET /vectors/list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub prefix: Option<String>,
    pub limit: Option<u32>,
    pub pagination_token: Option<String>,
    pub namespace: Option<String>,
}

/// One page of record ids.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ListResponse {
    #[serde(default)]
    pub vectors: Vec<ListItem>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ListResponse {
    /// Token for the next page, if any.
    pub fn next_token(&self) -> Option<&str> {
        self.pagination.as_ref().and_then(|p| p.next.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ListItem {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub read_units: u64,
}

/// Operations the adapter needs from Pinecone.
#[async_trait]
pub trait PineconeApi: Send + Sync {
    /// Create a serverless index.
    async fn create_index(&self, request: &CreateIndexRequest) -> Result<IndexModel>;

    /// Delete an index. 404 maps to `IndexNotFound`.
    async fn delete_index(&self, name: &str) -> Result<()>;

    /// Describe an index. 404 maps to `IndexNotFound`.
    async fn describe_index(&self, name: &str) -> Result<IndexModel>;

    /// Upsert records into an index.
    async fn upsert(
        &self,
        index_name: &str,
        vectors: &[UpsertRecord],
        namespace: Option<&str>,
    ) -> Result<UpsertResponse>;

    /// List one page of record ids.
    async fn list_paginated(&self, index_name: &str, options: &ListOptions)
        -> Result<ListResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_index_request_shape() {
        let spec = IndexSpec::new(384);
        let value = serde_json::to_value(CreateIndexRequest::from(&spec)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "anything",
                "dimension": 384,
                "metric": "cosine",
                "spec": {"serverless": {"cloud": "aws", "region": "us-east-1"}}
            })
        );
    }

    #[test]
    fn test_parse_index_model() {
        let model: IndexModel = serde_json::from_str(
            r#"{
                "name": "anything",
                "dimension": 384,
                "metric": "cosine",
                "host": "anything-abc123.svc.aped-4627-b74a.pinecone.io",
                "spec": {"serverless": {"cloud": "aws", "region": "us-east-1"}},
                "status": {"ready": true, "state": "Ready"},
                "deletion_protection": "disabled"
            }"#,
        )
        .unwrap();

        assert_eq!(model.dimension, Some(384));
        assert!(model.status.ready);
        assert_eq!(model.host, "anything-abc123.svc.aped-4627-b74a.pinecone.io");
    }

    #[test]
    fn test_parse_list_response() {
        let page: ListResponse = serde_json::from_str(
            r#"{
                "vectors": [{"id": "a"}, {"id": "b"}],
                "pagination": {"next": "tok"},
                "namespace": "",
                "usage": {"readUnits": 1}
            }"#,
        )
        .unwrap();

        assert_eq!(page.vectors.len(), 2);
        assert_eq!(page.next_token(), Some("tok"));
        assert_eq!(page.usage.map(|u| u.read_units), Some(1));

        let last: ListResponse = serde_json::from_str(r#"{"vectors": []}"#).unwrap();
        assert_eq!(last.next_token(), None);
    }

    #[test]
    fn test_upsert_request_omits_default_namespace() {
        let records: Vec<UpsertRecord> = Vec::new();
        let body = UpsertRequest {
            vectors: &records,
            namespace: None,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), serde_json::json!({"vectors": []}));
    }
}
