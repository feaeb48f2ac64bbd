//! embedsync CLI entry point.

use anyhow::Result;
use clap::Parser;
use embedsync::cli::{commands, Cli, Commands};
use embedsync::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration; PINECONE_API_KEY is read once here
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    }
    .with_pinecone_api_key(cli.pinecone_api_key.clone());

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("embedsync={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::EmbedFile { path, model } => {
            commands::run_embed_file(path, model, settings).await?;
        }

        Commands::EmbedQuery { queries, model } => {
            commands::run_embed_query(queries, model, settings).await?;
        }

        Commands::EmbedDir {
            dir,
            extensions,
            model,
        } => {
            commands::run_embed_dir(dir, extensions, model, settings).await?;
        }

        Commands::Demo {
            file,
            index,
            queries,
            backend,
            model,
        } => {
            commands::run_demo(file, index.clone(), queries, *backend, model, settings).await?;
        }

        Commands::List {
            index,
            prefix,
            limit,
            pagination_token,
        } => {
            commands::run_list(
                index.clone(),
                prefix.clone(),
                *limit,
                pagination_token.clone(),
                settings,
            )
            .await?;
        }

        Commands::DeleteIndex { name } => {
            commands::run_delete_index(name, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
