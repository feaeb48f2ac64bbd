//! Embedding-driven chunking.
//!
//! Text is first pre-split into small sentence-sized pieces. Each piece is
//! embedded and compared against the mean of the pieces just before it; a
//! chunk boundary is placed wherever that similarity drops below a
//! threshold. Chunks never exceed `chunk_size` characters.

use crate::adapter::cosine_similarity;
use crate::embedding::Embedder;
use crate::error::{EmbedSyncError, Result};
use text_splitter::TextSplitter;
use tracing::debug;

/// Default number of preceding pieces averaged into the context vector.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Step applied to the threshold bounds while searching for a threshold.
const THRESHOLD_ADJUSTMENT: f32 = 0.01;

/// Splits text at drops in embedding similarity.
pub struct SemanticChunker {
    chunk_size: usize,
    window_size: usize,
    /// Fixed threshold. When `None` it is derived per document.
    score_threshold: Option<f32>,
    splitter: TextSplitter<text_splitter::Characters>,
}

impl SemanticChunker {
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(EmbedSyncError::InvalidInput(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            chunk_size,
            window_size: DEFAULT_WINDOW_SIZE,
            score_threshold: None,
            splitter: TextSplitter::new((chunk_size / 4).max(1)),
        })
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    /// Use a fixed similarity threshold instead of deriving one.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    /// Split text into ordered, non-blank chunks.
    pub async fn chunk(
        &self,
        text: &str,
        embedder: &dyn Embedder,
        batch_size: usize,
    ) -> Result<Vec<String>> {
        let pieces: Vec<String> = self
            .splitter
            .chunks(text)
            .filter(|piece| !piece.trim().is_empty())
            .map(str::to_string)
            .collect();

        if pieces.len() < 2 {
            return Ok(pieces);
        }

        let mut embeddings = Vec::with_capacity(pieces.len());
        for batch in pieces.chunks(batch_size.max(1)) {
            embeddings.extend(embedder.embed_batch(batch).await?);
        }

        let scores = similarity_scores(&embeddings, self.window_size);
        let threshold = match self.score_threshold {
            Some(threshold) => threshold,
            None => self.find_threshold(&pieces, &scores),
        };
        let boundaries = split_indices(&scores, threshold);
        let chunks = self.merge(pieces, &boundaries);

        debug!(
            "Split {} bytes into {} semantic chunks (threshold {:.3})",
            text.len(),
            chunks.len(),
            threshold
        );
        Ok(chunks)
    }

    /// Binary search for a threshold whose median chunk length lands in
    /// `[chunk_size / 2, chunk_size]`.
    fn find_threshold(&self, pieces: &[String], scores: &[f32]) -> f32 {
        let median_score = median(scores);
        let std_dev = std_dev(scores);
        let mut low = (median_score - std_dev).max(0.0);
        let mut high = (median_score + std_dev).min(1.0);
        let min_chars = self.chunk_size / 2;

        let mut threshold = median_score;
        while low <= high {
            threshold = (low + high) / 2.0;
            let lengths: Vec<f32> = self
                .merge(pieces.to_vec(), &split_indices(scores, threshold))
                .iter()
                .map(|chunk| chunk.chars().count() as f32)
                .collect();
            let median_len = median(&lengths);

            if median_len >= min_chars as f32 && median_len <= self.chunk_size as f32 {
                break;
            } else if median_len < min_chars as f32 {
                high = threshold - THRESHOLD_ADJUSTMENT;
            } else {
                low = threshold + THRESHOLD_ADJUSTMENT;
            }
        }
        threshold
    }

    /// Join pieces into chunks, starting a new chunk at each boundary or
    /// when the next piece would exceed `chunk_size`.
    fn merge(&self, pieces: Vec<String>, boundaries: &[usize]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0;

        for (idx, piece) in pieces.into_iter().enumerate() {
            let piece = piece.trim().to_string();
            let piece_len = piece.chars().count();
            let at_boundary = boundaries.contains(&idx);
            let too_long = current_len + 1 + piece_len > self.chunk_size;

            if !current.is_empty() && (at_boundary || too_long) {
                chunks.push(current.join(" "));
                current.clear();
                current_len = 0;
            }

            current_len += if current.is_empty() { piece_len } else { piece_len + 1 };
            current.push(piece);
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }
        chunks
    }
}

/// Similarity of each piece (from the second on) to the mean of the
/// `window_size` pieces before it.
fn similarity_scores(embeddings: &[Vec<f32>], window_size: usize) -> Vec<f32> {
    (1..embeddings.len())
        .map(|i| {
            let window = &embeddings[i.saturating_sub(window_size)..i];
            let dim = embeddings[i].len();
            let mut context = vec![0.0f32; dim];
            for embedding in window {
                for (c, v) in context.iter_mut().zip(embedding) {
                    *c += v;
                }
            }
            for c in &mut context {
                *c /= window.len() as f32;
            }
            cosine_similarity(&embeddings[i], &context)
        })
        .collect()
}

/// Piece indices that start a new chunk.
fn split_indices(scores: &[f32], threshold: f32) -> Vec<usize> {
    scores
        .iter()
        .enumerate()
        .filter(|(_, &score)| score < threshold)
        .map(|(idx, _)| idx + 1)
        .collect()
}

fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn std_dev(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / (values.len() - 1) as f32;
    variance.sqrt()
}
