use serde::{Deserialize, Serialize};

/// Statistics for a single reconciliation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileStats {
    /// Records in the corpus at the time of the pass.
    pub records: usize,

    /// Records embedded this pass (added or changed).
    pub embedded: usize,

    /// Records untouched because their fingerprint matched.
    pub unchanged: usize,

    /// Records whose embedding failed; they are retried next pass.
    pub failed: usize,

    /// Chunks dropped for deleted or replaced records.
    pub deleted_chunks: usize,

    /// Chunks inserted.
    pub inserted_chunks: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Per-record error messages.
    pub errors: Vec<String>,
}

impl ReconcileStats {
    pub fn add_error(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }
}
