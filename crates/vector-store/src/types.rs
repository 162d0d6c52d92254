use serde::{Deserialize, Serialize};

/// A text fragment plus its embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Positional identifier of the corpus record this chunk came from.
    /// Only stable between reconciliations.
    pub payload_index: usize,

    /// The text that was handed to the embedder.
    pub text: String,

    /// Dense embedding; length equals the store's declared dimensionality.
    pub vector: Vec<f32>,
}

/// A search hit at the store level, before payload resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredChunk {
    pub payload_index: usize,
    pub score: f32,
}
