use crate::config::{EmbedConfig, EmbeddingMode, DEFAULT_STUB_DIMENSIONS};
use crate::error::{EmbedError, Result};
use crate::stub::StubEmbedder;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::env;

/// Converts text to fixed-dimension dense vectors.
#[derive(Clone)]
pub struct EmbeddingClient {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Remote(RemoteEmbedder),
    Stub(StubEmbedder),
}

impl EmbeddingClient {
    /// Backend selection by `QA_EMBEDDING_MODE`; remote unless overridden.
    pub fn from_env() -> Result<Self> {
        match EmbeddingMode::from_env()? {
            EmbeddingMode::Remote => Self::remote(EmbedConfig::from_env()?),
            EmbeddingMode::Stub => {
                let dimensions = match env::var("QA_EMBEDDING_DIMENSIONS") {
                    Ok(raw) => raw.trim().parse::<usize>().map_err(|_| {
                        EmbedError::Config(format!(
                            "QA_EMBEDDING_DIMENSIONS is not a number: '{raw}'"
                        ))
                    })?,
                    Err(_) => DEFAULT_STUB_DIMENSIONS,
                };
                log::info!("Using stub embedding backend ({dimensions} dimensions)");
                Ok(Self::stub(StubEmbedder::new(dimensions)))
            }
        }
    }

    pub fn remote(config: EmbedConfig) -> Result<Self> {
        Ok(Self {
            backend: Backend::Remote(RemoteEmbedder::new(config)?),
        })
    }

    #[must_use]
    pub fn stub(stub: StubEmbedder) -> Self {
        Self {
            backend: Backend::Stub(stub),
        }
    }

    /// Declared dimensionality of every vector this client produces.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        match &self.backend {
            Backend::Remote(remote) => remote.dimensions,
            Backend::Stub(stub) => stub.dimensions(),
        }
    }

    /// Embed one text: `embed_batch` over a single input.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text]).await?;
        Ok(vectors.pop().unwrap_or_default())
    }

    /// Embed a batch, returning vectors in input order. Fails with
    /// `Transport` on network trouble and `Rejected` when the provider
    /// refuses or the response is off-contract.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        match &self.backend {
            Backend::Remote(remote) => remote.embed_batch(texts).await,
            Backend::Stub(stub) => {
                let mut vectors = Vec::with_capacity(texts.len());
                for text in texts {
                    vectors.push(stub.embed(text)?);
                }
                Ok(vectors)
            }
        }
    }

    /// Calls served by the stub backend, `None` on the remote backend.
    #[must_use]
    pub fn stub_calls(&self) -> Option<usize> {
        match &self.backend {
            Backend::Remote(_) => None,
            Backend::Stub(stub) => Some(stub.calls()),
        }
    }
}

/// Client for an OpenAI-compatible embeddings endpoint.
#[derive(Clone)]
struct RemoteEmbedder {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    dimensions: usize,
}

impl RemoteEmbedder {
    fn new(config: EmbedConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(EmbedError::Config("embedding API key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| EmbedError::Config("embedding API key is not header-safe".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| {
                EmbedError::Config(format!("failed to build embedding HTTP client: {err}"))
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model,
            dimensions: config.dimensions,
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|err| EmbedError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            // 5xx is the provider's trouble, 4xx is ours.
            if status.is_server_error() {
                return Err(EmbedError::Transport(format!(
                    "embedding request failed ({status}): {body}"
                )));
            }
            return Err(EmbedError::Rejected(format!(
                "embedding request failed ({status}): {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| EmbedError::Rejected(format!("malformed embedding response: {err}")))?;

        let mut data = parsed.data;
        data.sort_by_key(|entry| entry.index);
        if data.len() != texts.len() {
            return Err(EmbedError::Rejected(format!(
                "provider returned {} embeddings for {} inputs",
                data.len(),
                texts.len()
            )));
        }

        let mut vectors = Vec::with_capacity(data.len());
        for entry in data {
            if entry.embedding.len() != self.dimensions {
                return Err(EmbedError::Rejected(format!(
                    "provider returned {} dimensions, expected {}",
                    entry.embedding.len(),
                    self.dimensions
                )));
            }
            vectors.push(entry.embedding);
        }
        Ok(vectors)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> EmbedConfig {
        EmbedConfig {
            api_key: "sk-test".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            base_url: "https://api.openai.com/v1/".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn remote_rejects_empty_api_key() {
        let mut config = config();
        config.api_key = "   ".to_string();
        assert!(matches!(
            EmbeddingClient::remote(config),
            Err(EmbedError::Config(_))
        ));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let remote = RemoteEmbedder::new(config()).unwrap();
        assert_eq!(remote.endpoint, "https://api.openai.com/v1/embeddings");
    }

    #[test]
    fn request_body_matches_provider_contract() {
        let request = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &["hello"],
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"model": "text-embedding-3-small", "input": ["hello"]})
        );
    }

    #[test]
    fn response_body_parses_provider_contract() {
        let parsed: EmbeddingResponse = serde_json::from_str(
            r#"{"data": [{"embedding": [0.5, -0.25], "index": 1}, {"embedding": [1.0]}], "model": "m"}"#,
        )
        .unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.5, -0.25]);
        assert_eq!(parsed.data[0].index, 1);
        // A missing index defaults to zero, keeping stable sort order.
        assert_eq!(parsed.data[1].index, 0);
    }

    #[tokio::test]
    async fn stub_backend_counts_calls() {
        let client = EmbeddingClient::stub(StubEmbedder::new(8));
        client.embed("one").await.unwrap();
        client.embed("two").await.unwrap();
        assert_eq!(client.stub_calls(), Some(2));
        assert_eq!(client.dimensions(), 8);
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let client = EmbeddingClient::stub(StubEmbedder::new(8));
        let vectors = client.embed_batch(&["one", "two"]).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], client.embed("one").await.unwrap());
        assert_eq!(vectors[1], client.embed("two").await.unwrap());
    }

    #[tokio::test]
    async fn empty_batch_embeds_nothing() {
        let client = EmbeddingClient::stub(StubEmbedder::new(8));
        assert!(client.embed_batch(&[]).await.unwrap().is_empty());
        assert_eq!(client.stub_calls(), Some(0));
    }

    #[tokio::test]
    async fn stub_failure_marker_rejects() {
        let client = EmbeddingClient::stub(StubEmbedder::failing_on(8, "poison"));
        assert!(client.embed("clean").await.is_ok());
        assert!(matches!(
            client.embed("this is poison").await,
            Err(EmbedError::Rejected(_))
        ));
    }
}
