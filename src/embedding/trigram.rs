//! Local character-trigram embeddings.

use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Default dimensionality of trigram embeddings.
pub const DEFAULT_TRIGRAM_DIMENSIONS: usize = 384;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Offline embedder that hashes each word, plus the character trigrams
/// within it, into a fixed-size vector.
///
/// The vectors are content-dependent and deterministic but carry no learned
/// semantics. Useful for running pipelines without network access.
#[derive(Debug, Clone)]
pub struct TrigramEmbedder {
    model_id: String,
    dimensions: usize,
}

impl TrigramEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self::with_model_id("trigram-v1", dimensions)
    }

    pub fn with_model_id(model_id: &str, dimensions: usize) -> Self {
        Self {
            model_id: model_id.to_string(),
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();
        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.chars().count() > 2)
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let hash = window
                    .iter()
                    .fold(0u64, |acc, c| acc.wrapping_mul(37).wrapping_add(*c as u64));
                embedding[(hash % self.dimensions as u64) as usize] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            embedding[(word_hash % self.dimensions as u64) as usize] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

impl Default for TrigramEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGRAM_DIMENSIONS)
    }
}

#[async_trait]
impl Embedder for TrigramEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
