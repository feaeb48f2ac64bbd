//! HTTP client for the Pinecone REST API.

use super::{
    CreateIndexRequest, IndexModel, ListOptions, ListResponse, PineconeApi, UpsertRequest,
    UpsertResponse,
};
use crate::adapter::UpsertRecord;
use crate::config::PineconeSettings;
use crate::error::{EmbedSyncError, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use url::Url;

/// Interval between status checks after index creation or deletion.
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Pinecone REST client.
pub struct PineconeClient {
    http: reqwest::Client,
    api_key: Option<String>,
    controller_url: Url,
    api_version: String,
    ready_timeout: Duration,
    poll_interval: Duration,
    /// Data plane host per index name.
    hosts: Mutex<HashMap<String, String>>,
}

impl PineconeClient {
    /// Create a client from the `[pinecone]` settings.
    ///
    /// A missing API key is passed through as-is; Pinecone rejects the
    /// requests.
    pub fn new(settings: &PineconeSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            controller_url: Url::parse(&settings.controller_url)?,
            api_version: settings.api_version.clone(),
            ready_timeout: settings.ready_timeout(),
            poll_interval: READY_POLL_INTERVAL,
            hosts: Mutex::new(HashMap::new()),
        })
    }

    /// Override the interval between index status checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-Pinecone-API-Version", &self.api_version);
        match &self.api_key {
            Some(key) => request.header("Api-Key", key),
            None => request,
        }
    }

    /// Control plane URL for `segments` appended to the configured base.
    fn controller_path(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.controller_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                EmbedSyncError::Config(format!(
                    "Invalid Pinecone controller URL: {}",
                    self.controller_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn index_url(&self, name: &str) -> Result<Url> {
        self.controller_path(&["indexes", name])
    }

    /// Data plane base URL of an index, resolving and caching its host.
    async fn data_plane_url(&self, index_name: &str, path: &str) -> Result<Url> {
        let cached = self.hosts.lock().await.get(index_name).cloned();
        let host = match cached {
            Some(host) => host,
            None => {
                let model = self.describe_index(index_name).await?;
                if model.host.is_empty() {
                    return Err(EmbedSyncError::InvalidState(format!(
                        "Index {} has no host yet",
                        index_name
                    )));
                }
                self.hosts
                    .lock()
                    .await
                    .insert(index_name.to_string(), model.host.clone());
                model.host
            }
        };

        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("https://{}", host)
        };
        Ok(Url::parse(&base)?.join(path)?)
    }

    /// Poll the index until it reports ready.
    async fn wait_until_ready(&self, name: &str) -> Result<IndexModel> {
        let started = Instant::now();
        loop {
            let model = self.describe_index(name).await?;
            if model.status.ready {
                return Ok(model);
            }
            if started.elapsed() >= self.ready_timeout {
                return Err(EmbedSyncError::Timeout(format!(
                    "Index {} not ready after {:?} (state: {})",
                    name, self.ready_timeout, model.status.state
                )));
            }
            debug!("Index {} is {}, waiting", name, model.status.state);
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Poll the index until describing it returns 404.
    async fn wait_until_deleted(&self, name: &str) -> Result<()> {
        let started = Instant::now();
        loop {
            let model = match self.describe_index(name).await {
                Err(EmbedSyncError::IndexNotFound(_)) => return Ok(()),
                other => other?,
            };
            if started.elapsed() >= self.ready_timeout {
                return Err(EmbedSyncError::Timeout(format!(
                    "Index {} not deleted after {:?} (state: {})",
                    name, self.ready_timeout, model.status.state
                )));
            }
            debug!("Index {} is {}, waiting for deletion", name, model.status.state);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Turn a non-success response into an error.
async fn check(response: Response, index_name: Option<&str>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    match (status, index_name) {
        (StatusCode::NOT_FOUND, Some(name)) => Err(EmbedSyncError::IndexNotFound(name.to_string())),
        _ => Err(EmbedSyncError::Pinecone {
            status: status.as_u16(),
            message,
        }),
    }
}

#[async_trait]
impl PineconeApi for PineconeClient {
    #[instrument(skip(self, request), fields(index = %request.name, dimension = request.dimension))]
    async fn create_index(&self, request: &CreateIndexRequest) -> Result<IndexModel> {
        let response = self
            .authorize(self.http.post(self.controller_path(&["indexes"])?))
            .json(request)
            .send()
            .await?;
        check(response, None).await?;

        info!("Created index {}, waiting until ready", request.name);
        let model = self.wait_until_ready(&request.name).await?;
        self.hosts
            .lock()
            .await
            .insert(request.name.clone(), model.host.clone());
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, name: &str) -> Result<()> {
        let response = self
            .authorize(self.http.delete(self.index_url(name)?))
            .send()
            .await?;
        check(response, Some(name)).await?;
        self.hosts.lock().await.remove(name);

        info!("Deleting index {}, waiting until gone", name);
        self.wait_until_deleted(name).await?;
        info!("Deleted index {}", name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn describe_index(&self, name: &str) -> Result<IndexModel> {
        let response = self
            .authorize(self.http.get(self.index_url(name)?))
            .send()
            .await?;
        let response = check(response, Some(name)).await?;
        Ok(response.json::<IndexModel>().await?)
    }

    #[instrument(skip(self, vectors), fields(count = vectors.len()))]
    async fn upsert(
        &self,
        index_name: &str,
        vectors: &[UpsertRecord],
        namespace: Option<&str>,
    ) -> Result<UpsertResponse> {
        let url = self.data_plane_url(index_name, "/vectors/upsert").await?;
        let body = UpsertRequest { vectors, namespace };

        let response = self.authorize(self.http.post(url)).json(&body).send().await?;
        let response = check(response, None).await?;
        let result = response.json::<UpsertResponse>().await?;

        debug!("Upserted {} vectors into {}", result.upserted_count, index_name);
        Ok(result)
    }

    #[instrument(skip(self, options))]
    async fn list_paginated(
        &self,
        index_name: &str,
        options: &ListOptions,
    ) -> Result<ListResponse> {
        let mut url = self.data_plane_url(index_name, "/vectors/list").await?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(prefix) = &options.prefix {
                query.append_pair("prefix", prefix);
            }
            if let Some(limit) = options.limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(token) = &options.pagination_token {
                query.append_pair("paginationToken", token);
            }
            if let Some(namespace) = &options.namespace {
                query.append_pair("namespace", namespace);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let response = self.authorize(self.http.get(url)).send().await?;
        let response = check(response, None).await?;
        Ok(response.json::<ListResponse>().await?)
    }
}
