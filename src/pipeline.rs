//! Embedding pipeline.
//!
//! Turns queries, files and directories into [`EmbedData`], optionally
//! streaming the results into an [`Adapter`] instead of returning them.

use crate::adapter::Adapter;
use crate::chunking::{SemanticChunker, TextChunker};
use crate::config::SplittingStrategy;
use crate::embedding::{EmbedData, Embedder, TextEmbedConfig};
use crate::error::Result;
use crate::loader::{collect_files, file_metadata, load_text};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Buffers embeddings and flushes them to an adapter in fixed-size groups.
struct UpsertBuffer<'a> {
    adapter: &'a dyn Adapter,
    capacity: usize,
    pending: Vec<EmbedData>,
    flushed: usize,
}

impl<'a> UpsertBuffer<'a> {
    fn new(adapter: &'a dyn Adapter, capacity: usize) -> Self {
        Self {
            adapter,
            capacity,
            pending: Vec::with_capacity(capacity),
            flushed: 0,
        }
    }

    async fn push(&mut self, items: Vec<EmbedData>) -> Result<()> {
        for item in items {
            self.pending.push(item);
            if self.pending.len() >= self.capacity {
                self.flush().await?;
            }
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.adapter.upsert(&self.pending).await?;
        self.flushed += self.pending.len();
        self.pending.clear();
        Ok(())
    }
}

/// Embed texts in `batch_size` groups, preserving order.
async fn embed_in_batches(
    texts: &[String],
    embedder: &dyn Embedder,
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let mut embeddings = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size) {
        embeddings.extend(embedder.embed_batch(batch).await?);
    }
    Ok(embeddings)
}

/// Embed literal query strings, one result per query.
#[instrument(skip_all, fields(count = queries.len()))]
pub async fn embed_query(
    queries: &[String],
    embedder: &dyn Embedder,
    config: &TextEmbedConfig,
) -> Result<Vec<EmbedData>> {
    config.validate()?;

    let embeddings = embed_in_batches(queries, embedder, config.batch_size).await?;
    Ok(queries
        .iter()
        .zip(embeddings)
        .map(|(query, embedding)| EmbedData::new(embedding, Some(query.clone()), None))
        .collect())
}

/// Chunk and embed one file.
async fn embed_file_chunks(
    path: &Path,
    embedder: &dyn Embedder,
    config: &TextEmbedConfig,
) -> Result<Vec<EmbedData>> {
    let text = load_text(path).await?;
    let chunks = match config.splitting_strategy {
        SplittingStrategy::Sentence => TextChunker::new(config.chunk_size)?.chunk(&text),
        SplittingStrategy::Semantic => {
            SemanticChunker::new(config.chunk_size)?
                .chunk(&text, embedder, config.batch_size)
                .await?
        }
    };
    let metadata = file_metadata(path);

    let embeddings = embed_in_batches(&chunks, embedder, config.batch_size).await?;
    Ok(chunks
        .into_iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| EmbedData::new(embedding, Some(chunk), Some(metadata.clone())))
        .collect())
}

/// Embed a file.
///
/// Without an adapter the embeddings are returned. With one, they are
/// upserted in groups of `buffer_size` and `None` is returned.
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn embed_file(
    path: &Path,
    embedder: &dyn Embedder,
    config: &TextEmbedConfig,
    adapter: Option<&dyn Adapter>,
) -> Result<Option<Vec<EmbedData>>> {
    config.validate()?;
    let data = embed_file_chunks(path, embedder, config).await?;
    info!("Embedded {} chunks from {}", data.len(), path.display());

    match adapter {
        Some(adapter) => {
            let mut buffer = UpsertBuffer::new(adapter, config.buffer_size);
            buffer.push(data).await?;
            buffer.flush().await?;
            info!("Upserted {} embeddings", buffer.flushed);
            Ok(None)
        }
        None => Ok(Some(data)),
    }
}

/// Embed every supported file under a directory.
///
/// Files that fail to load or embed are logged and skipped. Adapter
/// errors abort the run.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub async fn embed_directory(
    dir: &Path,
    embedder: &dyn Embedder,
    extensions: Option<&[String]>,
    config: &TextEmbedConfig,
    adapter: Option<&dyn Adapter>,
) -> Result<Option<Vec<EmbedData>>> {
    config.validate()?;
    let files = collect_files(dir, extensions)?;
    info!("Found {} files in {}", files.len(), dir.display());

    let mut buffer = adapter.map(|a| UpsertBuffer::new(a, config.buffer_size));
    let mut collected = Vec::new();

    for file in &files {
        let data = match embed_file_chunks(file, embedder, config).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Skipping {:?}: {}", file, e);
                continue;
            }
        };

        match buffer.as_mut() {
            Some(buffer) => buffer.push(data).await?,
            None => collected.extend(data),
        }
    }

    match buffer {
        Some(mut buffer) => {
            buffer.flush().await?;
            info!("Upserted {} embeddings", buffer.flushed);
            Ok(None)
        }
        None => Ok(Some(collected)),
    }
}
