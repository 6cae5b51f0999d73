//! In-memory cache of the user's transactions

use crate::error::{CoreError, CoreResult, GatewayResult};
use crate::gateway::Gateway;
use crate::models::Transaction;

/// Authoritative local copy of every transaction, replaced wholesale
#[derive(Debug, Clone, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the full list, in gateway order
    pub fn all(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Unfiltered count
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn replace(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    /// Apply the outcome of a list call; a failure leaves the store empty
    pub fn apply(&mut self, result: GatewayResult<Vec<Transaction>>) -> CoreResult<()> {
        match result {
            Ok(transactions) => {
                log::debug!("Transaction store replaced with {} entries", transactions.len());
                self.replace(transactions);
                Ok(())
            }
            Err(e) => {
                self.clear();
                Err(CoreError::from_gateway(e, false))
            }
        }
    }

    /// Fetch the full list and replace the store
    pub async fn reload(&mut self, gateway: &dyn Gateway) -> CoreResult<()> {
        let result = gateway.list_transactions().await;
        self.apply(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::test_support::transaction;
    use crate::types::Category;

    #[test]
    fn test_apply_replaces_wholesale() {
        let mut store = TransactionStore::new();
        store.replace(vec![transaction(1, 1, Category::Income, 10)]);

        store
            .apply(Ok(vec![
                transaction(2, 1, Category::Income, 20),
                transaction(3, 2, Category::Expense, 5),
            ]))
            .unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get(1).is_none());
        assert_eq!(store.get(3).map(|t| t.transaction_type_id), Some(2));
    }

    #[test]
    fn test_apply_failure_clears() {
        let mut store = TransactionStore::new();
        store.replace(vec![transaction(1, 1, Category::Income, 10)]);

        let err = store
            .apply(Err(GatewayError::http(500, "boom", serde_json::Value::Null)))
            .unwrap_err();

        assert!(store.is_empty());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_all_returns_a_copy() {
        let mut store = TransactionStore::new();
        store.replace(vec![transaction(1, 1, Category::Income, 10)]);

        let mut snapshot = store.all();
        snapshot.clear();

        assert_eq!(store.len(), 1);
    }
}
