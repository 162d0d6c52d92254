//! On-disk format for the cache artifact.
//!
//! A single pretty-printed JSON file, written atomically through a `.tmp`
//! sibling. On read, absence is distinguishable from corruption: absence is
//! `Ok(None)`, anything else that fails is `CacheCorrupt`.

use crate::error::{Result, StoreError};
use crate::types::Chunk;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub const CACHE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    schema_version: u32,
    dimensions: usize,
    /// Informational only; never compared.
    saved_at_unix_ms: u64,
    vectors: Vec<Chunk>,
}

pub(crate) struct CacheArtifact {
    pub dimensions: usize,
    pub vectors: Vec<Chunk>,
}

pub(crate) async fn load(path: &Path) -> Result<Option<CacheArtifact>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(StoreError::CacheCorrupt(format!(
                "failed to read cache at {}: {err}",
                path.display()
            )))
        }
    };

    let persisted: PersistedIndex = serde_json::from_slice(&bytes).map_err(|err| {
        StoreError::CacheCorrupt(format!(
            "failed to parse cache at {}: {err}",
            path.display()
        ))
    })?;

    if persisted.schema_version != CACHE_SCHEMA_VERSION {
        return Err(StoreError::CacheCorrupt(format!(
            "unsupported cache schema_version {} (expected {CACHE_SCHEMA_VERSION})",
            persisted.schema_version
        )));
    }

    for chunk in &persisted.vectors {
        if chunk.vector.len() != persisted.dimensions {
            return Err(StoreError::CacheCorrupt(format!(
                "cache at {} declares {} dimensions but holds a {}-dimension vector",
                path.display(),
                persisted.dimensions,
                chunk.vector.len()
            )));
        }
    }

    Ok(Some(CacheArtifact {
        dimensions: persisted.dimensions,
        vectors: persisted.vectors,
    }))
}

pub(crate) async fn save(path: &Path, dimensions: usize, vectors: &[Chunk]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let persisted = PersistedIndex {
        schema_version: CACHE_SCHEMA_VERSION,
        dimensions,
        saved_at_unix_ms: unix_now_ms(),
        vectors: vectors.to_vec(),
    };

    let bytes = serde_json::to_vec_pretty(&persisted)?;
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
