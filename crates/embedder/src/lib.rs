//! # QA Embedder
//!
//! Converts text into fixed-dimension dense vectors through an external
//! OpenAI-compatible embeddings endpoint. A deterministic stub backend
//! (selected with `QA_EMBEDDING_MODE=stub`) serves tests and offline runs
//! and counts its calls so tests can assert how much embedding work a
//! reconciliation performed.
//!
//! Retries are deliberately absent at this layer; the reconciler's policy is
//! to leave a failed record out of its ledger and retry on the next pass.

mod client;
mod config;
mod error;
mod stub;

pub use client::EmbeddingClient;
pub use config::{EmbedConfig, EmbeddingMode, DEFAULT_BASE_URL, DEFAULT_DIMENSIONS, DEFAULT_MODEL, DEFAULT_STUB_DIMENSIONS};
pub use error::{EmbedError, Result};
pub use stub::StubEmbedder;
