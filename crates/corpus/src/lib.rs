//! # QA Corpus
//!
//! Authoritative question/answer corpus: the record model, position-indexed
//! read access to the corpus file, and the content fingerprints used for
//! change detection.
//!
//! ```text
//! qa-corpus.json (JSON array)
//!     │
//!     ├──> CorpusStore (read_all / get / snapshot)
//!     │      └─> QaRecord
//!     │
//!     └──> fingerprint
//!            ├─> record_fingerprint  (MD5 of canonical form)
//!            └─> corpus_fingerprint  (MD5 of raw bytes)
//! ```
//!
//! The corpus is mutated only by the external CRUD surface; everything here
//! is read-only.

mod error;
pub mod fingerprint;
mod record;
mod store;

pub use error::{CorpusError, Result};
pub use record::QaRecord;
pub use store::{CorpusSnapshot, CorpusStore};
