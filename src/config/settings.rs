//! Configuration settings for embedsync.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the Pinecone API key.
pub const PINECONE_API_KEY_ENV: &str = "PINECONE_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub text_embed: TextEmbedSettings,
    pub pinecone: PineconeSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level used when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Embedding provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// OpenAI embeddings API.
    #[default]
    OpenAI,
    /// Local character-trigram embeddings (offline, deterministic).
    Trigram,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(EmbeddingProvider::OpenAI),
            "trigram" | "local" => Ok(EmbeddingProvider::Trigram),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::OpenAI => write!(f, "openai"),
            EmbeddingProvider::Trigram => write!(f, "trigram"),
        }
    }
}

/// How document text is split into chunks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SplittingStrategy {
    /// Size-bounded splitting on paragraph, sentence and word boundaries.
    #[default]
    Sentence,
    /// Embedding-driven splitting where neighbouring sentences stop being similar.
    Semantic,
}

impl std::str::FromStr for SplittingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sentence" => Ok(SplittingStrategy::Sentence),
            "semantic" => Ok(SplittingStrategy::Semantic),
            _ => Err(format!("Unknown splitting strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for SplittingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplittingStrategy::Sentence => write!(f, "sentence"),
            SplittingStrategy::Semantic => write!(f, "semantic"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai, trigram).
    pub provider: EmbeddingProvider,
    /// Pretrained model identifier.
    pub model: String,
    /// Embedding dimensions. Shortens OpenAI v3 vectors; sizes trigram vectors.
    pub dimensions: u32,
    /// Timeout for a single embedding request.
    pub request_timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::OpenAI,
            model: "text-embedding-3-small".to_string(),
            dimensions: 384,
            request_timeout_secs: 300,
        }
    }
}

/// Chunking and batching settings for text embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextEmbedSettings {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of chunks sent to the embedder per call.
    pub batch_size: usize,
    /// Number of embeddings buffered before each adapter upsert.
    pub buffer_size: usize,
    /// Splitting strategy (sentence, semantic).
    pub splitting_strategy: SplittingStrategy,
}

impl Default for TextEmbedSettings {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            batch_size: 32,
            buffer_size: 100,
            splitting_strategy: SplittingStrategy::Sentence,
        }
    }
}

/// Pinecone settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeSettings {
    /// API key. `PINECONE_API_KEY` takes precedence when set.
    pub api_key: Option<String>,
    /// Index used by the demo and list commands.
    pub index_name: String,
    /// Distance metric (cosine, euclidean, dotproduct).
    pub metric: String,
    /// Serverless cloud provider.
    pub cloud: String,
    /// Serverless region.
    pub region: String,
    /// Control plane base URL.
    pub controller_url: String,
    /// Value of the `X-Pinecone-API-Version` header.
    pub api_version: String,
    /// Namespace for upserts and listings. Empty means the default namespace.
    pub namespace: Option<String>,
    /// Timeout for a single HTTP request.
    pub request_timeout_secs: u64,
    /// How long `create_index` waits for the index to become ready.
    pub ready_timeout_secs: u64,
}

impl Default for PineconeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            index_name: "anything".to_string(),
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            controller_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
            namespace: None,
            request_timeout_secs: 60,
            ready_timeout_secs: 300,
        }
    }
}

impl PineconeSettings {
    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Index readiness timeout.
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::EmbedSyncError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("embedsync")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Apply an API key taken from the command line or `PINECONE_API_KEY`.
    ///
    /// A `None` override keeps whatever the config file holds, which may
    /// itself be `None`; the key is not validated here.
    pub fn with_pinecone_api_key(mut self, api_key: Option<String>) -> Self {
        if api_key.is_some() {
            self.pinecone.api_key = api_key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.text_embed.chunk_size, 256);
        assert_eq!(settings.text_embed.batch_size, 32);
        assert_eq!(settings.text_embed.buffer_size, 100);
        assert_eq!(settings.pinecone.index_name, "anything");
        assert_eq!(settings.pinecone.metric, "cosine");
        assert_eq!(settings.pinecone.cloud, "aws");
        assert_eq!(settings.pinecone.region, "us-east-1");
        assert_eq!(settings.embedding.provider, EmbeddingProvider::OpenAI);
        assert!(settings.pinecone.api_key.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [text_embed]
            chunk_size = 200
            splitting_strategy = "semantic"

            [embedding]
            provider = "trigram"
            "#,
        )
        .unwrap();

        assert_eq!(settings.text_embed.chunk_size, 200);
        assert_eq!(settings.text_embed.batch_size, 32);
        assert_eq!(settings.text_embed.splitting_strategy, SplittingStrategy::Semantic);
        assert_eq!(settings.embedding.provider, EmbeddingProvider::Trigram);
        assert_eq!(settings.embedding.model, "text-embedding-3-small");
        assert_eq!(settings.pinecone.index_name, "anything");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.pinecone.index_name = "docs".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.pinecone.index_name, "docs");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.pinecone.index_name, "anything");
    }

    #[test]
    fn test_api_key_override() {
        let mut settings = Settings::default();
        settings.pinecone.api_key = Some("from-file".to_string());

        let kept = settings.clone().with_pinecone_api_key(None);
        assert_eq!(kept.pinecone.api_key.as_deref(), Some("from-file"));

        let replaced = settings.with_pinecone_api_key(Some("from-env".to_string()));
        assert_eq!(replaced.pinecone.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<EmbeddingProvider>(), Ok(EmbeddingProvider::OpenAI));
        assert_eq!("local".parse::<EmbeddingProvider>(), Ok(EmbeddingProvider::Trigram));
        assert!("bert".parse::<EmbeddingProvider>().is_err());
    }

    #[test]
    fn test_splitting_strategy_from_str() {
        assert_eq!("Semantic".parse::<SplittingStrategy>(), Ok(SplittingStrategy::Semantic));
        assert_eq!(SplittingStrategy::default().to_string(), "sentence");
        assert!("paragraph".parse::<SplittingStrategy>().is_err());
    }
}
