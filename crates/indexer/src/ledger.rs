//! Fingerprint ledger persistence.
//!
//! Two artifacts: the per-index digest map and the whole-corpus digest.
//! Both are written atomically and only after the cache artifact is durable.
//! An absent file reads as `None`; an unreadable one is logged and treated
//! as absent, which forces re-embedding (deleting a ledger file is the
//! documented way to do exactly that).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub const LEDGER_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedLedger {
    schema_version: u32,
    saved_at_unix_ms: u64,
    /// Positional index (as string) to 128-bit hex digest.
    indices_hash: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCorpusHash {
    schema_version: u32,
    saved_at_unix_ms: u64,
    corpus_hash: String,
}

pub async fn read_ledger(path: &Path) -> Result<Option<BTreeMap<usize, String>>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let persisted: PersistedLedger = match serde_json::from_slice(&bytes) {
        Ok(persisted) => persisted,
        Err(err) => {
            log::warn!(
                "Fingerprint ledger at {} is unreadable ({err}); treating as absent",
                path.display()
            );
            return Ok(None);
        }
    };

    if persisted.schema_version != LEDGER_SCHEMA_VERSION {
        log::warn!(
            "Fingerprint ledger at {} has unsupported schema_version {}; treating as absent",
            path.display(),
            persisted.schema_version
        );
        return Ok(None);
    }

    let mut ledger = BTreeMap::new();
    for (key, digest) in persisted.indices_hash {
        match key.parse::<usize>() {
            Ok(index) => {
                ledger.insert(index, digest);
            }
            Err(_) => {
                log::warn!("Dropping non-positional ledger key '{key}'");
            }
        }
    }
    Ok(Some(ledger))
}

pub async fn write_ledger(path: &Path, ledger: &BTreeMap<usize, String>) -> Result<()> {
    let persisted = PersistedLedger {
        schema_version: LEDGER_SCHEMA_VERSION,
        saved_at_unix_ms: unix_now_ms(),
        indices_hash: ledger
            .iter()
            .map(|(index, digest)| (index.to_string(), digest.clone()))
            .collect(),
    };
    write_atomic(path, &serde_json::to_vec_pretty(&persisted)?).await
}

pub async fn read_corpus_hash(path: &Path) -> Result<Option<String>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    match serde_json::from_slice::<PersistedCorpusHash>(&bytes) {
        Ok(persisted) if persisted.schema_version == LEDGER_SCHEMA_VERSION => {
            Ok(Some(persisted.corpus_hash))
        }
        Ok(persisted) => {
            log::warn!(
                "Corpus digest at {} has unsupported schema_version {}; treating as absent",
                path.display(),
                persisted.schema_version
            );
            Ok(None)
        }
        Err(err) => {
            log::warn!(
                "Corpus digest at {} is unreadable ({err}); treating as absent",
                path.display()
            );
            Ok(None)
        }
    }
}

pub async fn write_corpus_hash(path: &Path, corpus_hash: &str) -> Result<()> {
    let persisted = PersistedCorpusHash {
        schema_version: LEDGER_SCHEMA_VERSION,
        saved_at_unix_ms: unix_now_ms(),
        corpus_hash: corpus_hash.to_string(),
    };
    write_atomic(path, &serde_json::to_vec_pretty(&persisted)?).await
}

/// Drop a persisted corpus digest, disarming the fast path.
pub async fn clear_corpus_hash(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
