//! End-to-end demo: embed queries, recreate an index, stream a file into it.

use super::load_model;
use crate::adapter::{Adapter, IndexSpec, MemoryAdapter, PineconeAdapter};
use crate::cli::{Backend, ModelArgs, Output};
use crate::config::Settings;
use crate::embedding::{EmbedData, Embedder, EmbeddingModel, TextEmbedConfig};
use crate::error::EmbedSyncError;
use crate::pinecone::{ListOptions, PineconeClient};
use crate::pipeline::{embed_file, embed_query};
use anyhow::Result;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Run the demo command.
pub async fn run_demo(
    file: &str,
    index: Option<String>,
    queries: &[String],
    backend: Backend,
    args: &ModelArgs,
    settings: Settings,
) -> Result<()> {
    let start_time = Instant::now();
    let (settings, model, config) = load_model(settings, args)?;

    let data = embed_query(queries, &model, &config).await?;

    let index_name = index.unwrap_or_else(|| settings.pinecone.index_name.clone());
    let spec = IndexSpec::new(model.dimensions())
        .with_name(&index_name)
        .with_metric(&settings.pinecone.metric)
        .with_serverless(&settings.pinecone.cloud, &settings.pinecone.region);

    match backend {
        Backend::Pinecone => {
            let client = PineconeClient::new(&settings.pinecone)?;
            let mut adapter =
                PineconeAdapter::new(client).with_namespace(settings.pinecone.namespace.clone());

            recreate_index(&mut adapter, spec).await?;
            stream_file(file, &model, &config, &adapter).await?;

            print_queries(&data);
            let page = adapter.list_paginated(ListOptions::default()).await?;
            Output::header(&format!("Index {}", index_name));
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Backend::Memory => {
            let mut adapter = MemoryAdapter::new();

            recreate_index(&mut adapter, spec).await?;
            stream_file(file, &model, &config, &adapter).await?;

            print_queries(&data);
            Output::header(&format!("Index {}", index_name));
            Output::kv("Records", &adapter.len().await?.to_string());
            for query in &data {
                if let Some(hit) = adapter.search(&query.embedding, 1).await?.first() {
                    Output::kv(
                        query.text.as_deref().unwrap_or_default(),
                        &format!(
                            "{} (score: {:.2})",
                            hit.record.metadata.get("file").map(String::as_str).unwrap_or_default(),
                            hit.score
                        ),
                    );
                }
            }
        }
    }

    Output::kv("Time taken", &format!("{:?}", start_time.elapsed()));
    Ok(())
}

/// Delete the index if it exists, then create it.
async fn recreate_index(adapter: &mut dyn Adapter, spec: IndexSpec) -> Result<()> {
    match adapter.delete_index(&spec.name).await {
        Ok(()) => info!("Deleted existing index {}", spec.name),
        Err(EmbedSyncError::IndexNotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let spinner = Output::spinner(&format!("Creating index {}...", spec.name));
    let result = adapter.create_index(spec).await;
    spinner.finish_and_clear();
    result?;
    Ok(())
}

async fn stream_file(
    file: &str,
    model: &EmbeddingModel,
    config: &TextEmbedConfig,
    adapter: &dyn Adapter,
) -> Result<()> {
    let spinner = Output::spinner(&format!("Embedding {} into the index...", file));
    let result = embed_file(Path::new(file), model, config, Some(adapter)).await;
    spinner.finish_and_clear();
    result?;
    Output::success(&format!("Streamed {} into the index", file));
    Ok(())
}

fn print_queries(data: &[EmbedData]) {
    Output::header("Query embeddings");
    for item in data {
        println!("{}", item);
    }
}
