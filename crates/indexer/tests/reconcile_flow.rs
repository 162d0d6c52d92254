//! End-to-end reconciliation flows over a real temp directory, using the
//! stub embedder so embedding work can be counted.

use qa_chunker::{Chunker, ChunkerConfig};
use qa_corpus::CorpusStore;
use qa_embedder::{EmbeddingClient, StubEmbedder};
use qa_indexer::{ledger, Reconciler};
use qa_vector_store::VectorStore;
use serde_json::json;
use std::collections::BTreeMap;
use tempfile::TempDir;
use tokio::sync::RwLock;

const DIMS: usize = 16;

struct Harness {
    dir: TempDir,
    client: EmbeddingClient,
    reconciler: Reconciler,
    store: RwLock<VectorStore>,
}

impl Harness {
    fn new() -> Self {
        Self::with_client(EmbeddingClient::stub(StubEmbedder::new(DIMS)))
    }

    fn with_client(client: EmbeddingClient) -> Self {
        let dir = TempDir::new().unwrap();
        let reconciler = Reconciler::new(
            CorpusStore::new(dir.path().join("qa-corpus.json")),
            client.clone(),
            Chunker::new(ChunkerConfig::default()).unwrap(),
            dir.path().join("vector-cache.json"),
            dir.path().join("indices-hash.json"),
            dir.path().join("corpus-hash.json"),
        );
        Self {
            dir,
            client,
            reconciler,
            store: RwLock::new(VectorStore::new()),
        }
    }

    async fn write_corpus(&self, records: serde_json::Value) {
        tokio::fs::write(
            self.dir.path().join("qa-corpus.json"),
            serde_json::to_vec_pretty(&records).unwrap(),
        )
        .await
        .unwrap();
    }

    async fn reconcile(&self) -> qa_indexer::ReconcileStats {
        self.reconciler.reconcile(&self.store).await.unwrap()
    }

    /// Simulate a process restart: forget all in-memory state.
    fn restart(&mut self) {
        self.store = RwLock::new(VectorStore::new());
    }

    fn calls(&self) -> usize {
        self.client.stub_calls().unwrap()
    }

    async fn read_ledger(&self) -> BTreeMap<usize, String> {
        ledger::read_ledger(&self.dir.path().join("indices-hash.json"))
            .await
            .unwrap()
            .unwrap_or_default()
    }

    async fn cached_vector_count(&self) -> usize {
        let bytes = tokio::fs::read(self.dir.path().join("vector-cache.json"))
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        parsed["vectors"].as_array().unwrap().len()
    }
}

fn record(question: &str, answer: &str) -> serde_json::Value {
    json!({
        "question": question,
        "answer": answer,
        "category": "general",
        "audience": "customers",
        "keywords": ["faq"]
    })
}

fn three_records() -> serde_json::Value {
    json!([
        record("How do I log in?", "Use the login page."),
        record("How do I reset my password?", "Use the reset link."),
        record("How do I delete my account?", "Contact support.")
    ])
}

#[tokio::test]
async fn initial_reconcile_embeds_every_record() {
    let harness = Harness::new();
    harness.write_corpus(three_records()).await;

    let stats = harness.reconcile().await;

    assert_eq!(harness.calls(), 3);
    assert_eq!(stats.embedded, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(harness.read_ledger().await.len(), 3);
    assert_eq!(harness.cached_vector_count().await, 3);
    assert_eq!(harness.store.read().await.count(), 3);
}

#[tokio::test]
async fn second_reconcile_is_a_noop() {
    let harness = Harness::new();
    harness.write_corpus(three_records()).await;

    harness.reconcile().await;
    let ledger_before = harness.read_ledger().await;
    let calls_before = harness.calls();

    let stats = harness.reconcile().await;

    assert_eq!(harness.calls(), calls_before, "no embedder calls expected");
    assert_eq!(stats.embedded, 0);
    assert_eq!(stats.unchanged, 3);
    assert_eq!(harness.read_ledger().await, ledger_before);
    assert_eq!(harness.cached_vector_count().await, 3);
}

#[tokio::test]
async fn reformatting_the_corpus_file_embeds_nothing() {
    // The whole-file digest changes, the per-record digests do not.
    let harness = Harness::new();
    harness.write_corpus(three_records()).await;
    harness.reconcile().await;
    let calls_before = harness.calls();

    tokio::fs::write(
        harness.dir.path().join("qa-corpus.json"),
        serde_json::to_vec(&three_records()).unwrap(),
    )
    .await
    .unwrap();

    let stats = harness.reconcile().await;
    assert_eq!(harness.calls(), calls_before);
    assert_eq!(stats.unchanged, 3);
}

#[tokio::test]
async fn editing_one_record_re_embeds_only_that_index() {
    let harness = Harness::new();
    harness.write_corpus(three_records()).await;
    harness.reconcile().await;
    let ledger_before = harness.read_ledger().await;
    let calls_before = harness.calls();

    harness
        .write_corpus(json!([
            record("How do I log in?", "Use the login page."),
            record("How do I reset my password?", "Use the self-service portal."),
            record("How do I delete my account?", "Contact support.")
        ]))
        .await;

    let stats = harness.reconcile().await;
    let ledger_after = harness.read_ledger().await;

    assert_eq!(harness.calls(), calls_before + 1);
    assert_eq!(stats.embedded, 1);
    assert_ne!(ledger_after[&1], ledger_before[&1]);
    assert_eq!(ledger_after[&0], ledger_before[&0]);
    assert_eq!(ledger_after[&2], ledger_before[&2]);
    assert_eq!(harness.store.read().await.count_by_payload_index(1), 1);
    assert_eq!(harness.store.read().await.count(), 3);
}

#[tokio::test]
async fn deleting_the_first_record_shifts_the_rest() {
    let harness = Harness::new();
    harness.write_corpus(three_records()).await;
    harness.reconcile().await;
    let ledger_before = harness.read_ledger().await;
    let calls_before = harness.calls();

    harness
        .write_corpus(json!([
            record("How do I reset my password?", "Use the reset link."),
            record("How do I delete my account?", "Contact support.")
        ]))
        .await;

    let stats = harness.reconcile().await;
    let ledger_after = harness.read_ledger().await;

    // Positional identity: both surviving records land in new slots and are
    // re-embedded; the old tail fingerprint disappears.
    assert_eq!(harness.calls(), calls_before + 2);
    assert_eq!(stats.embedded, 2);
    assert_eq!(ledger_after.len(), 2);
    assert!(!ledger_after.contains_key(&2));
    assert_eq!(ledger_after[&0], ledger_before[&1]);
    assert_eq!(ledger_after[&1], ledger_before[&2]);

    let store = harness.store.read().await;
    assert_eq!(store.count(), 2);
    assert_eq!(store.count_by_payload_index(2), 0, "no orphan chunks");
}

#[tokio::test]
async fn corrupt_cache_triggers_full_rebuild() {
    let mut harness = Harness::new();
    harness.write_corpus(three_records()).await;
    harness.reconcile().await;
    let ledger_before = harness.read_ledger().await;
    let calls_before = harness.calls();

    // Truncate the cache to zero bytes and restart.
    tokio::fs::write(harness.dir.path().join("vector-cache.json"), b"")
        .await
        .unwrap();
    harness.restart();

    let stats = harness.reconcile().await;

    assert_eq!(harness.calls(), calls_before + 3);
    assert_eq!(stats.embedded, 3);
    assert_eq!(harness.read_ledger().await, ledger_before);
    assert_eq!(harness.store.read().await.count(), 3);
    assert_eq!(harness.cached_vector_count().await, 3);
}

#[tokio::test]
async fn restart_with_intact_cache_embeds_nothing() {
    let mut harness = Harness::new();
    harness.write_corpus(three_records()).await;
    harness.reconcile().await;
    let calls_before = harness.calls();

    harness.restart();
    let stats = harness.reconcile().await;

    assert_eq!(harness.calls(), calls_before);
    assert_eq!(stats.embedded, 0);
    assert_eq!(harness.store.read().await.count(), 3);
}

#[tokio::test]
async fn deleting_the_ledger_forces_full_re_embedding() {
    let mut harness = Harness::new();
    harness.write_corpus(three_records()).await;
    harness.reconcile().await;
    let calls_before = harness.calls();

    tokio::fs::remove_file(harness.dir.path().join("indices-hash.json"))
        .await
        .unwrap();
    harness.restart();

    let stats = harness.reconcile().await;
    assert_eq!(harness.calls(), calls_before + 3);
    assert_eq!(stats.embedded, 3);
    assert_eq!(
        harness.store.read().await.count(),
        3,
        "cached chunks are replaced, not duplicated"
    );
}

#[tokio::test]
async fn empty_corpus_reconciles_to_empty_state() {
    let harness = Harness::new();
    harness.write_corpus(json!([])).await;

    let stats = harness.reconcile().await;

    assert_eq!(stats.records, 0);
    assert_eq!(harness.calls(), 0);
    assert!(harness.store.read().await.is_empty());
    assert!(harness.read_ledger().await.is_empty());
}

#[tokio::test]
async fn emptying_the_corpus_drops_every_chunk() {
    let harness = Harness::new();
    harness.write_corpus(three_records()).await;
    harness.reconcile().await;

    harness.write_corpus(json!([])).await;
    let stats = harness.reconcile().await;

    assert_eq!(stats.deleted_chunks, 3);
    assert!(harness.store.read().await.is_empty());
    assert!(harness.read_ledger().await.is_empty());
    assert_eq!(harness.cached_vector_count().await, 0);
}

#[tokio::test]
async fn embed_failure_skips_the_record_and_retries_next_pass() {
    let client = EmbeddingClient::stub(StubEmbedder::failing_on(DIMS, "unlucky"));
    let harness = Harness::with_client(client);
    harness
        .write_corpus(json!([
            record("How do I log in?", "Use the login page."),
            record("What about my unlucky question?", "It fails to embed."),
            record("How do I delete my account?", "Contact support.")
        ]))
        .await;

    let stats = harness.reconcile().await;

    assert_eq!(stats.embedded, 2);
    assert_eq!(stats.failed, 1);
    let ledger = harness.read_ledger().await;
    assert_eq!(ledger.len(), 2);
    assert!(!ledger.contains_key(&1), "failed index stays out of the ledger");
    assert!(
        ledger::read_corpus_hash(&harness.dir.path().join("corpus-hash.json"))
            .await
            .unwrap()
            .is_none(),
        "a partial pass must not arm the fast path"
    );

    // The next pass retries only the failed record.
    let calls_before = harness.calls();
    let stats = harness.reconcile().await;
    assert_eq!(harness.calls(), calls_before + 1);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn ledger_matches_store_payload_indices_after_reconcile() {
    let harness = Harness::new();
    harness.write_corpus(three_records()).await;
    harness.reconcile().await;

    let ledger = harness.read_ledger().await;
    let store = harness.store.read().await;
    for index in ledger.keys() {
        assert!(
            store.count_by_payload_index(*index) > 0,
            "ledger index {index} has no chunks"
        );
    }
}
