//! CLI command implementations.

mod config;
mod demo;
mod embed;
mod index;

pub use config::run_config;
pub use demo::run_demo;
pub use embed::{run_embed_dir, run_embed_file, run_embed_query};
pub use index::{run_delete_index, run_list};

use crate::cli::ModelArgs;
use crate::config::{EmbeddingProvider, Settings, SplittingStrategy};
use crate::embedding::{EmbeddingModel, TextEmbedConfig};
use anyhow::{anyhow, Result};

/// Apply command-line overrides to the `[embedding]` and `[text_embed]` settings.
fn apply_model_args(mut settings: Settings, args: &ModelArgs) -> Result<Settings> {
    if let Some(provider) = &args.provider {
        settings.embedding.provider = provider
            .parse::<EmbeddingProvider>()
            .map_err(|e| anyhow!(e))?;
    }
    if let Some(model) = &args.model {
        settings.embedding.model = model.clone();
    }
    if let Some(dimensions) = args.dimensions {
        settings.embedding.dimensions = dimensions;
    }
    if let Some(chunk_size) = args.chunk_size {
        settings.text_embed.chunk_size = chunk_size;
    }
    if let Some(batch_size) = args.batch_size {
        settings.text_embed.batch_size = batch_size;
    }
    if let Some(buffer_size) = args.buffer_size {
        settings.text_embed.buffer_size = buffer_size;
    }
    if let Some(strategy) = &args.splitting_strategy {
        settings.text_embed.splitting_strategy = strategy
            .parse::<SplittingStrategy>()
            .map_err(|e| anyhow!(e))?;
    }
    Ok(settings)
}

/// Build the embedding model and text config for a command.
fn load_model(
    settings: Settings,
    args: &ModelArgs,
) -> Result<(Settings, EmbeddingModel, TextEmbedConfig)> {
    let settings = apply_model_args(settings, args)?;
    let model = EmbeddingModel::from_settings(&settings.embedding)?;
    let config = TextEmbedConfig::from(&settings.text_embed);
    config.validate()?;
    Ok((settings, model, config))
}
