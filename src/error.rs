//! Error types for embedsync.

use thiserror::Error;

/// Library-level error type for embedsync operations.
#[derive(Error, Debug)]
pub enum EmbedSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Pinecone API error ({status}): {message}")]
    Pinecone { status: u16, message: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl EmbedSyncError {
    /// Whether this error reports a missing index.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EmbedSyncError::IndexNotFound(_))
    }
}

/// Result type alias for embedsync operations.
pub type Result<T> = std::result::Result<T, EmbedSyncError>;
