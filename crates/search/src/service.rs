use crate::config::ServiceConfig;
use crate::error::Result;
use qa_chunker::{Chunker, ChunkerConfig};
use qa_corpus::CorpusStore;
use qa_embedder::EmbeddingClient;
use qa_indexer::{ReconcileStats, Reconciler};
use qa_vector_store::VectorStore;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Over-fetch factor so multi-chunk records can collapse into single hits
/// without starving the result list.
const OVERFETCH: usize = 4;

/// A ranked retrieval result, resolved back to its corpus record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub audience: String,
    pub keywords: Vec<String>,
    pub similarity: f32,
    pub rank: usize,
}

/// Retrieval surface over the reconciled vector index.
pub struct QaSearch {
    config: ServiceConfig,
    corpus: CorpusStore,
    embedder: EmbeddingClient,
    store: RwLock<VectorStore>,
    reconciler: Reconciler,
    /// At most one reconciliation in flight; overlapping refreshes queue
    /// here and each sees its predecessor's ledger.
    reconcile_gate: Mutex<()>,
    initialized: AtomicBool,
}

impl QaSearch {
    pub fn new(config: ServiceConfig, embedder: EmbeddingClient) -> Result<Self> {
        let corpus = CorpusStore::new(&config.corpus_path);
        let chunker = Chunker::new(ChunkerConfig {
            chunk_size: config.chunk_size,
            overlap: config.chunk_overlap,
        })?;
        let reconciler = Reconciler::new(
            corpus.clone(),
            embedder.clone(),
            chunker,
            &config.cache_path,
            &config.ledger_path,
            &config.corpus_hash_path,
        );
        Ok(Self {
            corpus,
            embedder,
            store: RwLock::new(VectorStore::new()),
            reconciler,
            reconcile_gate: Mutex::new(()),
            initialized: AtomicBool::new(false),
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the first reconciliation. Idempotent: concurrent callers coalesce
    /// on the gate and later callers find the work already done.
    pub async fn initialize(&self) -> Result<()> {
        let _gate = self.reconcile_gate.lock().await;
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        self.reconciler.reconcile(&self.store).await?;
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    /// Force a re-reconciliation; called after every external CRUD mutation
    /// of the corpus.
    pub async fn refresh(&self) -> Result<ReconcileStats> {
        let _gate = self.reconcile_gate.lock().await;
        let stats = self.reconciler.reconcile(&self.store).await?;
        self.initialized.store(true, Ordering::Release);
        Ok(stats)
    }

    /// Top-k retrieval. `k` is clamped to `[1, max_k]`. A query that embeds
    /// to the zero vector returns an empty list, not an error.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let k = k.clamp(1, self.config.max_k);
        if !self.initialized.load(Ordering::Acquire) {
            self.initialize().await?;
        }

        // Embed before taking the read lock so the cosine pass never holds
        // the store across provider I/O.
        let query_vector = self.embedder.embed(query).await?;
        if query_vector.iter().all(|component| *component == 0.0) {
            log::debug!("Query embedded to the zero vector; returning no hits");
            return Ok(Vec::new());
        }

        let scored = {
            let store = self.store.read().await;
            store.search(&query_vector, k.saturating_mul(OVERFETCH))
        };

        // Collapse multi-chunk records. The list is score-descending, so the
        // first appearance of a payload index carries its best score.
        let mut best: Vec<(usize, f32)> = Vec::new();
        for chunk in scored {
            if !best.iter().any(|(index, _)| *index == chunk.payload_index) {
                best.push((chunk.payload_index, chunk.score));
            }
        }

        let mut hits = Vec::with_capacity(k.min(best.len()));
        for (payload_index, score) in best {
            let Some(record) = self.corpus.get(payload_index).await? else {
                // Stale chunk: the corpus drifted and reconciliation has not
                // caught up. Skip silently.
                log::debug!("Skipping unresolvable payload index {payload_index}");
                continue;
            };
            hits.push(SearchHit {
                question: record.question,
                answer: record.answer,
                category: record.category,
                audience: record.audience,
                keywords: record.keywords,
                similarity: score,
                rank: hits.len() + 1,
            });
            if hits.len() == k {
                break;
            }
        }
        Ok(hits)
    }

    /// Search with the configured default `k`.
    pub async fn search_default(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.search(query, self.config.default_k).await
    }

    /// Chunks currently held in memory.
    pub async fn indexed_chunks(&self) -> usize {
        self.store.read().await.count()
    }
}
