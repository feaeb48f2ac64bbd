//! Configuration module for embedsync.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    EmbeddingProvider, EmbeddingSettings, GeneralSettings, PineconeSettings, Settings,
    SplittingStrategy, TextEmbedSettings, PINECONE_API_KEY_ENV,
};
