//! # QA Search
//!
//! Function-level retrieval surface over the reconciled vector index.
//!
//! Single-writer, many-reader: searches embed their query first, then share
//! the store's read lock for the cosine pass only; reconciliations serialize
//! on an async gate and take the write lock just around store mutation, so a
//! slow embedding provider never blocks readers.

mod config;
mod error;
mod service;

pub use config::{ServiceConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_DATA_DIR, DEFAULT_K, MAX_K};
pub use error::{Result, SearchError};
pub use service::{QaSearch, SearchHit};
