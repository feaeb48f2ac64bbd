//! embedsync - embed documents and stream them into a vector database
//!
//! # Overview
//!
//! embedsync turns files and queries into embeddings and hands them to a
//! vector store through a pluggable [`adapter::Adapter`]:
//! - Load a model by identifier (OpenAI, or a local trigram model)
//! - Chunk and embed PDFs, text files and whole directories
//! - Stream the results into Pinecone (or an in-memory store) as they are produced
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `loader` - Text extraction from documents
//! - `chunking` - Splitting text into embeddable chunks
//! - `embedding` - Embedding models and the data they produce
//! - `adapter` - Vector-store adapters
//! - `pinecone` - Pinecone REST client
//! - `pipeline` - Query, file and directory embedding
//!
//! # Example
//!
//! ```rust,no_run
//! use embedsync::adapter::{Adapter, IndexSpec, PineconeAdapter};
//! use embedsync::config::Settings;
//! use embedsync::embedding::{EmbeddingModel, TextEmbedConfig, WhichModel};
//! use embedsync::pinecone::PineconeClient;
//! use embedsync::pipeline::embed_file;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let model = EmbeddingModel::from_pretrained(WhichModel::OpenAI, "text-embedding-3-small")?;
//!     let config = TextEmbedConfig::new(200, 32);
//!
//!     let mut adapter = PineconeAdapter::new(PineconeClient::new(&settings.pinecone)?);
//!     adapter.create_index(IndexSpec::new(1536)).await?;
//!
//!     embed_file(Path::new("test_files/test.pdf"), &model, &config, Some(&adapter)).await?;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod loader;
pub mod openai;
pub mod pinecone;
pub mod pipeline;

pub use error::{EmbedSyncError, Result};
