//! Content fingerprints for change detection.
//!
//! Digests are 128-bit MD5 rendered as lowercase hex. They are compared for
//! equality only, never trusted for anything security-relevant.

use crate::record::QaRecord;
use md5::{Digest, Md5};
use std::collections::BTreeMap;

/// Digest of a record's canonical form.
#[must_use]
pub fn record_fingerprint(record: &QaRecord) -> String {
    let mut hasher = Md5::new();
    hasher.update(record.canonical_form().as_bytes());
    hex::encode(hasher.finalize())
}

/// Digest of the raw corpus file bytes, used as a coarse short-circuit: if
/// it matches the persisted value, the per-record diff can be skipped.
#[must_use]
pub fn corpus_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Per-record fingerprints keyed by position. Recomputed from scratch on
/// every call; no running state.
#[must_use]
pub fn fingerprint_records(records: &[QaRecord]) -> BTreeMap<usize, String> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| (index, record_fingerprint(record)))
        .collect()
}
