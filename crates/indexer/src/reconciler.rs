use crate::error::Result;
use crate::ledger;
use crate::plan::classify;
use crate::stats::ReconcileStats;
use qa_chunker::Chunker;
use qa_corpus::{fingerprint, CorpusStore, QaRecord};
use qa_embedder::EmbeddingClient;
use qa_vector_store::{Chunk, StoreError, VectorStore};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::RwLock;

/// Drives the vector store, cache artifact, and fingerprint ledger into
/// agreement with the current corpus.
///
/// One pass per invocation; callers serialize overlapping passes so at most
/// one reconciliation is in flight. Embedding I/O happens outside the
/// store's exclusive lock, which is taken only around chunk deletion and
/// insertion.
pub struct Reconciler {
    corpus: CorpusStore,
    embedder: EmbeddingClient,
    chunker: Chunker,
    cache_path: PathBuf,
    ledger_path: PathBuf,
    corpus_hash_path: PathBuf,
}

impl Reconciler {
    pub fn new(
        corpus: CorpusStore,
        embedder: EmbeddingClient,
        chunker: Chunker,
        cache_path: impl Into<PathBuf>,
        ledger_path: impl Into<PathBuf>,
        corpus_hash_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            corpus,
            embedder,
            chunker,
            cache_path: cache_path.into(),
            ledger_path: ledger_path.into(),
            corpus_hash_path: corpus_hash_path.into(),
        }
    }

    /// Run a single reconciliation pass against the shared store.
    ///
    /// Best-effort per record: an embedding failure skips that record and
    /// leaves it out of the new ledger, so the next pass retries it. The
    /// cache artifact is persisted before the ledger; never the other way
    /// around.
    pub async fn reconcile(&self, store: &RwLock<VectorStore>) -> Result<ReconcileStats> {
        let start = Instant::now();
        let mut stats = ReconcileStats::default();

        let snapshot = self.corpus.snapshot().await?;
        let curr = fingerprint::fingerprint_records(&snapshot.records);
        let corpus_digest = fingerprint::corpus_fingerprint(&snapshot.bytes);
        stats.records = snapshot.records.len();

        let force_full = self.warm_store(store).await?;

        let mut prev = ledger::read_ledger(&self.ledger_path)
            .await?
            .unwrap_or_default();
        if force_full {
            prev.clear();
        } else if !prev.is_empty() && store.read().await.is_empty() {
            // The ledger claims coverage the store cannot serve (cache
            // deleted or corrupt). Discard it so those records re-embed.
            log::warn!(
                "Ledger lists {} records but the vector store is empty; forcing full rebuild",
                prev.len()
            );
            prev.clear();
        }

        // Fast path: the whole-file digest only matches when the previous
        // pass was complete, so nothing below it can be pending.
        if !force_full && !prev.is_empty() {
            if let Some(prev_digest) = ledger::read_corpus_hash(&self.corpus_hash_path).await? {
                if prev_digest == corpus_digest {
                    log::debug!("Corpus digest unchanged; skipping per-record diff");
                    stats.unchanged = prev.len();
                    stats.time_ms = start.elapsed().as_millis() as u64;
                    return Ok(stats);
                }
            }
        }

        let plan = classify(&prev, &curr);
        log::info!(
            "Reconcile plan: {} added, {} changed, {} deleted, {} unchanged",
            plan.added.len(),
            plan.changed.len(),
            plan.deleted.len(),
            plan.unchanged.len()
        );

        // Stale chunks go first, before any re-embedding, so a replaced
        // record can never coexist with its old vectors. `added` is included
        // because a reset ledger classifies cached records as added.
        {
            let mut guard = store.write().await;
            for index in plan
                .deleted
                .iter()
                .chain(plan.changed.iter())
                .chain(plan.added.iter())
            {
                stats.deleted_chunks += guard.delete_by_payload_index(*index);
            }
        }

        let mut next_ledger: BTreeMap<usize, String> = BTreeMap::new();
        for index in &plan.unchanged {
            if let Some(digest) = curr.get(index) {
                next_ledger.insert(*index, digest.clone());
            }
        }

        // Ascending index order; each record's chunks are inserted in one
        // lock acquisition, so cancellation between records cannot leave a
        // record partially embedded.
        for index in plan.pending() {
            let Some(record) = snapshot.records.get(index) else {
                continue;
            };
            match self.embed_record(index, record).await {
                Ok(chunks) => {
                    {
                        let mut guard = store.write().await;
                        stats.inserted_chunks += guard.insert(chunks)?;
                    }
                    stats.embedded += 1;
                    if let Some(digest) = curr.get(&index) {
                        next_ledger.insert(index, digest.clone());
                    }
                }
                Err(err) => {
                    log::warn!(
                        "Embedding failed for record {index}; it will be retried next pass: {err}"
                    );
                    stats.add_error(format!("record {index}: {err}"));
                }
            }
        }

        {
            let guard = store.read().await;
            guard.save_to_file(&self.cache_path).await?;
        }
        ledger::write_ledger(&self.ledger_path, &next_ledger).await?;
        if stats.failed == 0 {
            ledger::write_corpus_hash(&self.corpus_hash_path, &corpus_digest).await?;
        } else {
            // A partial pass must not arm the fast path against its own retry.
            ledger::clear_corpus_hash(&self.corpus_hash_path).await?;
        }

        stats.unchanged = plan.unchanged.len();
        stats.time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Reconciliation complete: {} records, {} embedded, {} unchanged, {} failed, {} chunks dropped, {} inserted",
            stats.records,
            stats.embedded,
            stats.unchanged,
            stats.failed,
            stats.deleted_chunks,
            stats.inserted_chunks
        );
        Ok(stats)
    }

    /// Warm a cold store from the cache artifact and align its
    /// dimensionality with the embedder. Returns true when cached state had
    /// to be discarded, which forces a full rebuild.
    async fn warm_store(&self, store: &RwLock<VectorStore>) -> Result<bool> {
        let dimensions = self.embedder.dimensions();

        if store.read().await.is_empty() {
            // Stage the load outside the lock; only the swap mutates shared
            // state.
            let mut staged = VectorStore::new();
            match staged.load_from_file(&self.cache_path).await {
                Ok(true) => {}
                Ok(false) => {
                    log::debug!(
                        "No vector cache at {}; starting fresh",
                        self.cache_path.display()
                    );
                }
                Err(StoreError::CacheCorrupt(message)) => {
                    log::warn!("Vector cache is corrupt, rebuilding from scratch: {message}");
                }
                Err(err) => return Err(err.into()),
            }
            if !staged.is_empty() {
                let mut guard = store.write().await;
                if guard.is_empty() {
                    *guard = staged;
                }
            }
        }

        let mut guard = store.write().await;
        if !guard.is_empty() && guard.dimensions() != dimensions {
            log::warn!(
                "Embedding dimensionality changed ({} → {}), dropping cache and rebuilding",
                guard.dimensions(),
                dimensions
            );
            *guard = VectorStore::new();
            guard.set_dimensions(dimensions);
            return Ok(true);
        }
        guard.set_dimensions(dimensions);
        Ok(false)
    }

    /// Embed one record: all of its windows go out as a single batch.
    async fn embed_record(&self, index: usize, record: &QaRecord) -> qa_embedder::Result<Vec<Chunk>> {
        let text = record.searchable_text();
        let windows = self.chunker.chunk_str(&text);
        let inputs: Vec<&str> = windows.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(&inputs).await?;
        Ok(windows
            .into_iter()
            .zip(vectors)
            .map(|(window, vector)| Chunk {
                payload_index: index,
                text: window,
                vector,
            })
            .collect())
    }
}
