//! # QA Chunker
//!
//! Splits searchable record text into overlapping character windows sized
//! for the embedding provider. Inputs at or under the window size pass
//! through as a single chunk, which is the common case for QA records.

mod chunker;
mod config;
mod error;

pub use chunker::Chunker;
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
