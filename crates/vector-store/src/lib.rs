//! # QA Vector Store
//!
//! In-memory vector storage with exact cosine similarity search, persisted
//! as a single self-describing JSON cache artifact.
//!
//! ```text
//! Chunk[]
//!     │
//!     ├──> VectorStore
//!     │      ├─> insert / delete_by_payload_index
//!     │      └─> search (exact cosine, O(N·D))
//!     │
//!     └──> codec
//!            └─> cache artifact (dimensions + vectors + timestamp)
//! ```
//!
//! The store is the single source of truth at runtime; the artifact on disk
//! is only a serialization of it, and deleting the file is a legal
//! operational reset.

mod codec;
mod error;
mod store;
mod types;

pub use codec::CACHE_SCHEMA_VERSION;
pub use error::{Result, StoreError};
pub use store::VectorStore;
pub use types::{Chunk, ScoredChunk};
