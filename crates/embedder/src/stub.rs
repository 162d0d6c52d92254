use crate::error::{EmbedError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Deterministic embedder for tests and offline runs.
///
/// Vectors are a byte histogram of the input: equal texts embed equally and
/// unrelated texts diverge, which is all cosine ranking needs in a test.
/// Empty input embeds to the zero vector, exercising the degenerate-query
/// path. Every attempt is counted, rejected ones included, so tests can
/// assert how many embedder calls a reconciliation made.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimensions: usize,
    calls: Arc<AtomicUsize>,
    failure_marker: Option<String>,
}

impl StubEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: Arc::new(AtomicUsize::new(0)),
            failure_marker: None,
        }
    }

    /// Fault injection: any input containing `marker` is rejected, the way
    /// a provider rejects an oversized or filtered payload.
    #[must_use]
    pub fn failing_on(dimensions: usize, marker: impl Into<String>) -> Self {
        Self {
            failure_marker: Some(marker.into()),
            ..Self::new(dimensions)
        }
    }

    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of embed attempts so far, shared across clones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self
            .failure_marker
            .as_deref()
            .is_some_and(|marker| text.contains(marker))
        {
            return Err(EmbedError::Rejected(
                "stub embedder rejected input by failure marker".to_string(),
            ));
        }

        let mut vector = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return Ok(vector);
        }
        for (position, byte) in text.bytes().enumerate() {
            let slot = (position + byte as usize) % self.dimensions;
            vector[slot] += f32::from(byte) / 255.0;
        }
        Ok(vector)
    }
}
