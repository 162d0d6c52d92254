use crate::codec;
use crate::error::{Result, StoreError};
use crate::types::{Chunk, ScoredChunk};
use std::path::Path;

/// In-memory collection of chunks with exact cosine search.
///
/// Chunks survive `set_dimensions`, so loading a cache before declaring
/// dimensionality is a supported sequence. No embedder lifecycle ever
/// touches this state behind the caller's back.
#[derive(Debug, Default)]
pub struct VectorStore {
    dimensions: usize,
    chunks: Vec<Chunk>,
}

impl VectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare embedding dimensionality. Previously loaded chunks are kept.
    pub fn set_dimensions(&mut self, dimensions: usize) {
        self.dimensions = dimensions;
    }

    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[must_use]
    pub fn count_by_payload_index(&self, index: usize) -> usize {
        self.chunks
            .iter()
            .filter(|chunk| chunk.payload_index == index)
            .count()
    }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Append chunks; every vector must match the declared dimensionality.
    /// Returns the number inserted.
    pub fn insert(&mut self, chunks: Vec<Chunk>) -> Result<usize> {
        for chunk in &chunks {
            if chunk.vector.len() != self.dimensions {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: chunk.vector.len(),
                });
            }
        }
        let inserted = chunks.len();
        self.chunks.extend(chunks);
        Ok(inserted)
    }

    /// Remove every chunk tied to `index`. Returns the number removed.
    pub fn delete_by_payload_index(&mut self, index: usize) -> usize {
        let before = self.chunks.len();
        self.chunks.retain(|chunk| chunk.payload_index != index);
        before - self.chunks.len()
    }

    /// Exact top-k cosine search over all chunks. Scores are in descending
    /// order; ties keep insertion order (stable sort), earlier wins.
    #[must_use]
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .map(|chunk| ScoredChunk {
                payload_index: chunk.payload_index,
                score: cosine_similarity(query, &chunk.vector),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    /// Replace in-memory state from the cache artifact, adopting its
    /// dimensionality. Returns whether a cache was found; a missing file is
    /// a normal outcome, not an error.
    pub async fn load_from_file(&mut self, path: &Path) -> Result<bool> {
        let Some(artifact) = codec::load(path).await? else {
            return Ok(false);
        };
        log::info!(
            "Loaded {} cached vectors ({} dimensions) from {}",
            artifact.vectors.len(),
            artifact.dimensions,
            path.display()
        );
        self.dimensions = artifact.dimensions;
        self.chunks = artifact.vectors;
        Ok(true)
    }

    /// Serialize the full in-memory state to the cache artifact.
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        codec::save(path, self.dimensions, &self.chunks).await?;
        log::debug!(
            "Saved {} vectors to cache at {}",
            self.chunks.len(),
            path.display()
        );
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut a_norm = 0.0f32;
    let mut b_norm = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        a_norm += x * x;
        b_norm += y * y;
    }
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    dot / (a_norm.sqrt() * b_norm.sqrt())
}
