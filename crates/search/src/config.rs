use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = ".qa-finder";
pub const DEFAULT_CORPUS_FILE: &str = "qa-corpus.json";
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;
pub const DEFAULT_K: usize = 10;
pub const MAX_K: usize = 50;

/// Service-level configuration: artifact locations and retrieval knobs.
///
/// The embedding provider has its own configuration in `qa_embedder`.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// The authoritative corpus file (JSON array of QA records).
    pub corpus_path: PathBuf,

    /// Cache artifact holding the persisted vectors.
    pub cache_path: PathBuf,

    /// Per-index fingerprint ledger.
    pub ledger_path: PathBuf,

    /// Whole-corpus fingerprint.
    pub corpus_hash_path: PathBuf,

    pub chunk_size: usize,
    pub chunk_overlap: usize,

    /// `k` used when the caller does not pass one.
    pub default_k: usize,

    /// Upper clamp for `k` at the external boundary.
    pub max_k: usize,
}

impl ServiceConfig {
    /// Artifacts rooted under `data_dir`, corpus wherever the caller says.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>, corpus_path: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            corpus_path: corpus_path.into(),
            cache_path: data_dir.join("vector-cache.json"),
            ledger_path: data_dir.join("indices-hash.json"),
            corpus_hash_path: data_dir.join("corpus-hash.json"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            default_k: DEFAULT_K,
            max_k: MAX_K,
        }
    }

    /// Defaults with `QA_DATA_DIR` / `QA_CORPUS_PATH` / `QA_CHUNK_SIZE` /
    /// `QA_CHUNK_OVERLAP` / `QA_DEFAULT_K` / `QA_MAX_K` overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let data_dir = env::var("QA_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let corpus_path =
            env::var("QA_CORPUS_PATH").unwrap_or_else(|_| DEFAULT_CORPUS_FILE.to_string());

        let mut config = Self::for_data_dir(data_dir, corpus_path);
        config.chunk_size = env_usize("QA_CHUNK_SIZE", config.chunk_size);
        config.chunk_overlap = env_usize("QA_CHUNK_OVERLAP", config.chunk_overlap);
        config.default_k = env_usize("QA_DEFAULT_K", config.default_k);
        config.max_k = env_usize("QA_MAX_K", config.max_k);
        config
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::for_data_dir(DEFAULT_DATA_DIR, DEFAULT_CORPUS_FILE)
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(default)
}
