// 🔒 Shared Analyzer - single writer / many readers
// The analyzer does no locking of its own; this handle is what a service shares

use crate::analyzer::TransactionAnalyzer;
use crate::transaction::{Transaction, TransactionId};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Default)]
pub struct SharedAnalyzer {
    inner: Arc<RwLock<TransactionAnalyzer>>,
}

impl SharedAnalyzer {
    pub fn new(analyzer: TransactionAnalyzer) -> Self {
        SharedAnalyzer {
            inner: Arc::new(RwLock::new(analyzer)),
        }
    }

    /// Run a query under the read lock
    pub fn read<R>(&self, query: impl FnOnce(&TransactionAnalyzer) -> R) -> R {
        query(&self.read_guard())
    }

    /// Append under the write lock
    pub fn append(&self, transaction: Transaction) {
        self.write_guard().append(transaction);
    }

    /// Assign the next ledger id and append, atomically
    ///
    /// `build` receives the id the record will carry.
    pub fn append_with<E>(
        &self,
        build: impl FnOnce(TransactionId) -> Result<Transaction, E>,
    ) -> Result<Transaction, E> {
        let mut analyzer = self.write_guard();
        let transaction = build(analyzer.next_id())?;
        analyzer.append(transaction.clone());
        Ok(transaction)
    }

    /// Owned copy of every record
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.read_guard().all_transactions().to_vec()
    }

    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    // Append-only data: a panic under the lock never leaves a half-written record
    fn read_guard(&self) -> RwLockReadGuard<'_, TransactionAnalyzer> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, TransactionAnalyzer> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<TransactionAnalyzer> for SharedAnalyzer {
    fn from(analyzer: TransactionAnalyzer) -> Self {
        SharedAnalyzer::new(analyzer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn create_test_transaction(id: i64, amount: f64) -> Transaction {
        Transaction::new(id, "debit", amount, "2021-01-01".parse().unwrap())
    }

    #[test]
    fn test_snapshot_is_detached() {
        let shared = SharedAnalyzer::new(TransactionAnalyzer::new(vec![create_test_transaction(1, 5.0)]));

        let before = shared.snapshot();
        shared.append(create_test_transaction(2, 7.0));

        assert_eq!(before.len(), 1);
        assert_eq!(shared.len(), 2);
        assert_eq!(shared.read(|a| a.total_amount()), 12.0);
    }

    #[test]
    fn test_append_with_assigns_ledger_ids() {
        let shared = SharedAnalyzer::default();

        let first = shared
            .append_with(|id| Ok::<_, ()>(Transaction::new(id, "credit", 1.0, "2021-01-01".parse().unwrap())))
            .unwrap();
        let second = shared
            .append_with(|id| Ok::<_, ()>(Transaction::new(id, "credit", 1.0, "2021-01-02".parse().unwrap())))
            .unwrap();

        assert_eq!(first.id, TransactionId::Number(1));
        assert_eq!(second.id, TransactionId::Number(2));
    }

    #[test]
    fn test_append_with_error_leaves_state_untouched() {
        let shared = SharedAnalyzer::default();
        let result = shared.append_with(|_| Err::<Transaction, _>("rejected"));

        assert_eq!(result.unwrap_err(), "rejected");
        assert!(shared.is_empty());
    }

    #[test]
    fn test_concurrent_appends_and_reads() {
        let shared = SharedAnalyzer::default();

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let handle = shared.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        handle.append(create_test_transaction(w * 100 + i, 1.0));
                        let _ = handle.read(|a| a.total_amount());
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(shared.len(), 100);
        assert_eq!(shared.read(|a| a.total_amount()), 100.0);
    }
}
