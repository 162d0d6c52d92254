use crate::error::{EmbedError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_DIMENSIONS: usize = 1536;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_STUB_DIMENSIONS: usize = 64;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which backend `EmbeddingClient` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    Remote,
    Stub,
}

impl EmbeddingMode {
    pub fn from_env() -> Result<Self> {
        let raw = env::var("QA_EMBEDDING_MODE")
            .unwrap_or_else(|_| "remote".to_string())
            .to_ascii_lowercase();
        match raw.as_str() {
            "remote" => Ok(Self::Remote),
            "stub" => Ok(Self::Stub),
            other => Err(EmbedError::Config(format!(
                "unsupported QA_EMBEDDING_MODE '{other}' (expected 'remote' or 'stub')"
            ))),
        }
    }
}

/// Remote backend configuration.
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    /// Bearer token for the provider.
    pub api_key: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Declared dimensionality; every returned vector must have this length.
    pub dimensions: usize,

    /// Endpoint root, `/embeddings` is appended.
    pub base_url: String,

    /// Deadline for a single embed call. Expiry surfaces as a transport
    /// error; there is no implicit retry.
    pub timeout: Duration,
}

impl EmbedConfig {
    /// Read `QA_EMBEDDING_*` variables. The API key is required; everything
    /// else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("QA_EMBEDDING_API_KEY")
            .map_err(|_| EmbedError::Config("QA_EMBEDDING_API_KEY is required".to_string()))?;
        let model = env::var("QA_EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let dimensions = match env::var("QA_EMBEDDING_DIMENSIONS") {
            Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
                EmbedError::Config(format!("QA_EMBEDDING_DIMENSIONS is not a number: '{raw}'"))
            })?,
            Err(_) => DEFAULT_DIMENSIONS,
        };
        let base_url =
            env::var("QA_EMBEDDING_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match env::var("QA_EMBEDDING_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                EmbedError::Config(format!("QA_EMBEDDING_TIMEOUT_SECS is not a number: '{raw}'"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            model,
            dimensions,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
