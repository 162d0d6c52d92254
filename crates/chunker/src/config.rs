use serde::{Deserialize, Serialize};

/// Configuration for splitting text into embedding windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Window size in characters.
    pub chunk_size: usize,

    /// Characters shared between consecutive windows.
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}

impl ChunkerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }

        if self.overlap >= self.chunk_size {
            return Err(format!(
                "overlap ({}) cannot reach chunk_size ({})",
                self.overlap, self.chunk_size
            ));
        }

        Ok(())
    }
}
