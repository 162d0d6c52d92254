//! Classification of corpus indices against the persisted ledger.

use std::collections::BTreeMap;

/// Outcome of diffing current record fingerprints against the previous
/// ledger. Index vectors are in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcilePlan {
    /// In the corpus but not the ledger.
    pub added: Vec<usize>,

    /// In both, with differing digests.
    pub changed: Vec<usize>,

    /// In the ledger but no longer in the corpus.
    pub deleted: Vec<usize>,

    /// In both, with equal digests.
    pub unchanged: Vec<usize>,
}

impl ReconcilePlan {
    /// Indices that need (re-)embedding, ascending.
    #[must_use]
    pub fn pending(&self) -> Vec<usize> {
        let mut pending: Vec<usize> = self
            .added
            .iter()
            .chain(self.changed.iter())
            .copied()
            .collect();
        pending.sort_unstable();
        pending
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.deleted.is_empty()
    }
}

/// Classify every index as added, changed, deleted, or unchanged.
#[must_use]
pub fn classify(
    prev: &BTreeMap<usize, String>,
    curr: &BTreeMap<usize, String>,
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();

    for (index, digest) in curr {
        match prev.get(index) {
            None => plan.added.push(*index),
            Some(old) if old != digest => plan.changed.push(*index),
            Some(_) => plan.unchanged.push(*index),
        }
    }

    for index in prev.keys() {
        if !curr.contains_key(index) {
            plan.deleted.push(*index);
        }
    }

    plan
}
