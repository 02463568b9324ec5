use std::collections::HashMap;
use std::sync::Mutex;

use veritas_core::{Transaction, TxId};
use veritas_crypto::canonical_bytes;

use crate::error::LedgerError;

struct PoolInner {
    order: Vec<TxId>,
    entries: HashMap<TxId, Transaction>,
}

/// The set of accepted, dual-signed transactions awaiting inclusion in a
/// block. Mutex-guarded rather than lock-free: the spec calls for a single
/// writer at mining time, and a plain mutex makes that discipline explicit
/// at the type level instead of relying on convention.
pub struct PendingPool {
    inner: Mutex<PoolInner>,
}

impl Default for PendingPool {
    fn default() -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                order: Vec::new(),
                entries: HashMap::new(),
            }),
        }
    }
}

impl PendingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tx`, keyed by its id. Resubmitting a transaction already in
    /// the pool is a no-op, not an error, as long as it's byte-identical to
    /// the one already pooled (spec property 9). A second, different
    /// transaction arriving under the same id is a `Conflict`, not a silent
    /// overwrite. Returns `true` if this call actually inserted a new entry.
    pub fn insert(&self, tx: Transaction) -> Result<bool, LedgerError> {
        let mut inner = self.inner.lock().expect("pending pool mutex poisoned");
        if let Some(existing) = inner.entries.get(&tx.id) {
            let existing_bytes = canonical_bytes(existing)?;
            let incoming_bytes = canonical_bytes(&tx)?;
            return if existing_bytes == incoming_bytes {
                Ok(false)
            } else {
                Err(LedgerError::Conflict(tx.id.clone()))
            };
        }
        inner.order.push(tx.id.clone());
        inner.entries.insert(tx.id.clone(), tx);
        Ok(true)
    }

    pub fn contains(&self, id: &str) -> bool {
        let inner = self.inner.lock().expect("pending pool mutex poisoned");
        inner.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().expect("pending pool mutex poisoned");
        inner.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone every pending transaction, in submission order, without
    /// removing them. Used to persist the pool's contents between process
    /// invocations (the pool itself is in-memory only).
    pub fn snapshot(&self) -> Vec<Transaction> {
        let inner = self.inner.lock().expect("pending pool mutex poisoned");
        inner.order.iter().filter_map(|id| inner.entries.get(id)).cloned().collect()
    }

    /// Remove and return every pending transaction, in original submission
    /// order. The caller is responsible for re-inserting them (via
    /// `insert`, not by mutating this pool directly) if the work they were
    /// drained for fails.
    pub fn drain_all(&self) -> Vec<Transaction> {
        let mut inner = self.inner.lock().expect("pending pool mutex poisoned");
        let order = std::mem::take(&mut inner.order);
        let mut entries = std::mem::take(&mut inner.entries);
        order
            .into_iter()
            .filter_map(|id| entries.remove(&id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_core::{Transaction, TransactionData};

    fn sample_tx(id: &str) -> Transaction {
        Transaction::new(
            id.to_string(),
            1_700_000_000_000,
            TransactionData::AdminAction {
                action: "noop".into(),
                payload: serde_json::json!({}),
            },
        )
    }

    #[test]
    fn insert_is_idempotent() {
        let pool = PendingPool::new();
        assert!(pool.insert(sample_tx("tx-1")).unwrap());
        assert!(!pool.insert(sample_tx("tx-1")).unwrap());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn conflicting_resubmission_under_the_same_id_is_rejected() {
        let pool = PendingPool::new();
        assert!(pool.insert(sample_tx("tx-1")).unwrap());

        let mut different = sample_tx("tx-1");
        different.timestamp += 1;
        let result = pool.insert(different);
        assert!(matches!(result, Err(LedgerError::Conflict(id)) if id == "tx-1"));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn drain_preserves_submission_order() {
        let pool = PendingPool::new();
        pool.insert(sample_tx("tx-1")).unwrap();
        pool.insert(sample_tx("tx-2")).unwrap();
        pool.insert(sample_tx("tx-3")).unwrap();

        let drained = pool.drain_all();
        let ids: Vec<_> = drained.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["tx-1", "tx-2", "tx-3"]);
        assert!(pool.is_empty());
    }

    #[test]
    fn reinsert_after_drain_goes_through_normal_insert_path() {
        let pool = PendingPool::new();
        pool.insert(sample_tx("tx-1")).unwrap();
        let drained = pool.drain_all();
        for tx in drained {
            assert!(pool.insert(tx).unwrap());
        }
        assert_eq!(pool.len(), 1);
    }
}
