//! Index commands: list and delete.

use crate::adapter::{Adapter, PineconeAdapter};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::EmbedSyncError;
use crate::pinecone::{ListOptions, PineconeClient};
use anyhow::Result;

/// Run the list command.
pub async fn run_list(
    index: Option<String>,
    prefix: Option<String>,
    limit: Option<u32>,
    pagination_token: Option<String>,
    settings: Settings,
) -> Result<()> {
    let index_name = index.unwrap_or_else(|| settings.pinecone.index_name.clone());
    let adapter = PineconeAdapter::new(PineconeClient::new(&settings.pinecone)?)
        .with_namespace(settings.pinecone.namespace.clone())
        .with_index(&index_name);

    let page = adapter
        .list_paginated(ListOptions {
            prefix,
            limit,
            pagination_token,
            namespace: None,
        })
        .await?;

    if page.vectors.is_empty() {
        Output::info(&format!("No records in {}.", index_name));
    } else {
        Output::header(&format!("Records in {} ({})", index_name, page.vectors.len()));
        for item in &page.vectors {
            Output::list_item(&item.id);
        }
    }

    if let Some(next) = page.next_token() {
        println!();
        Output::kv("Next page", next);
    }
    Ok(())
}

/// Run the delete-index command.
pub async fn run_delete_index(name: &str, settings: Settings) -> Result<()> {
    let adapter = PineconeAdapter::new(PineconeClient::new(&settings.pinecone)?);

    match adapter.delete_index(name).await {
        Ok(()) => Output::success(&format!("Deleted index {}", name)),
        Err(EmbedSyncError::IndexNotFound(_)) => {
            Output::warning(&format!("Index {} does not exist", name))
        }
        Err(e) => {
            Output::error(&format!("Failed to delete index: {}", e));
            return Err(e.into());
        }
    }
    Ok(())
}
