//! Embed commands: file, queries, directory.

use super::load_model;
use crate::cli::{ModelArgs, Output};
use crate::config::Settings;
use crate::embedding::Embedder;
use crate::pipeline::{embed_directory, embed_file, embed_query};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

/// Run the embed-file command.
pub async fn run_embed_file(path: &str, args: &ModelArgs, settings: Settings) -> Result<()> {
    let start = Instant::now();
    let (_, model, config) = load_model(settings, args)?;

    let spinner = Output::spinner(&format!("Embedding {} with {}...", path, model.model_id()));
    let result = embed_file(Path::new(path), &model, &config, None).await;
    spinner.finish_and_clear();

    let data = result?.ok_or_else(|| anyhow!("No embeddings returned"))?;
    match data.first() {
        Some(first) => {
            Output::success(&format!("Embedded {} chunks", data.len()));
            println!("{:?}", first.embedding);
        }
        None => Output::warning("No text found in file."),
    }

    Output::kv("Time taken", &format!("{:?}", start.elapsed()));
    Ok(())
}

/// Run the embed-query command.
pub async fn run_embed_query(queries: &[String], args: &ModelArgs, settings: Settings) -> Result<()> {
    let (_, model, config) = load_model(settings, args)?;

    let data = embed_query(queries, &model, &config).await?;

    Output::header(&format!("Embeddings ({})", model.model_id()));
    for item in &data {
        Output::embedding(item.text.as_deref(), &item.embedding);
    }
    Ok(())
}

/// Run the embed-dir command.
pub async fn run_embed_dir(
    dir: &str,
    extensions: &[String],
    args: &ModelArgs,
    settings: Settings,
) -> Result<()> {
    let start = Instant::now();
    let (_, model, config) = load_model(settings, args)?;
    let extensions = (!extensions.is_empty()).then_some(extensions);

    let spinner = Output::spinner(&format!("Embedding files in {}...", dir));
    let result = embed_directory(Path::new(dir), &model, extensions, &config, None).await;
    spinner.finish_and_clear();

    let data = result?.ok_or_else(|| anyhow!("No embeddings returned"))?;
    if data.is_empty() {
        Output::warning("No supported files found.");
        return Ok(());
    }

    let mut per_file: BTreeMap<&str, usize> = BTreeMap::new();
    for item in &data {
        let file = item
            .metadata_value(crate::embedding::FILE_NAME_KEY)
            .unwrap_or("<unknown>");
        *per_file.entry(file).or_insert(0) += 1;
    }

    Output::header(&format!("Embedded Files ({})", per_file.len()));
    for (file, chunks) in &per_file {
        Output::list_item(&format!("{} ({} chunks)", file, chunks));
    }
    println!();
    Output::kv("Total chunks", &data.len().to_string());
    Output::kv("Dimensions", &model.dimensions().to_string());
    Output::kv("Time taken", &format!("{:?}", start.elapsed()));
    Ok(())
}
