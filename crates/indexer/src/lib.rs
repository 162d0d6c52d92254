//! # QA Indexer
//!
//! Brings the vector store, cache artifact, and fingerprint ledger into
//! agreement with the current corpus.
//!
//! ```text
//! Corpus (JSON array)
//!     │
//!     ├──> fingerprints (per record + whole file)
//!     │
//!     ├──> plan::classify vs persisted ledger
//!     │      └─> added / changed / deleted / unchanged
//!     │
//!     └──> Reconciler
//!            ├─> drop stale chunks, embed pending records
//!            ├─> cache artifact          (written first)
//!            └─> fingerprint ledger      (written second)
//! ```
//!
//! The write ordering is deliberate: a crash between the two leaves the
//! cache ahead of the ledger, which the next run repairs by redoing only
//! truly changed records. The reverse would let the ledger claim vectors the
//! cache never got.

mod error;
pub mod ledger;
pub mod plan;
mod reconciler;
mod stats;

pub use error::{IndexerError, Result};
pub use plan::{classify, ReconcilePlan};
pub use reconciler::Reconciler;
pub use stats::ReconcileStats;
