use crate::error::Result;
use crate::record::QaRecord;
use std::path::{Path, PathBuf};

/// Read-only view of the authoritative corpus file, a JSON array of QA
/// records.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    path: PathBuf,
}

/// One consistent read of the corpus: the parsed records together with the
/// raw bytes they were parsed from, so record fingerprints and the
/// whole-file fingerprint always describe the same state.
#[derive(Debug)]
pub struct CorpusSnapshot {
    pub bytes: Vec<u8>,
    pub records: Vec<QaRecord>,
}

impl CorpusStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the whole corpus.
    pub async fn read_all(&self) -> Result<Vec<QaRecord>> {
        Ok(self.snapshot().await?.records)
    }

    /// Load the corpus once, keeping the raw bytes alongside the parsed
    /// records.
    pub async fn snapshot(&self) -> Result<CorpusSnapshot> {
        let bytes = tokio::fs::read(&self.path).await?;
        let records: Vec<QaRecord> = serde_json::from_slice(&bytes)?;
        Ok(CorpusSnapshot { bytes, records })
    }

    /// Position-indexed fetch. `None` when the index is out of range.
    pub async fn get(&self, index: usize) -> Result<Option<QaRecord>> {
        let mut records = self.read_all().await?;
        if index < records.len() {
            Ok(Some(records.swap_remove(index)))
        } else {
            Ok(None)
        }
    }
}
