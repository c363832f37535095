//! In-memory `TransactionStore` for tests and database-less local runs.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::{PoolStatus, StoreProbe, TransactionStore};
use crate::transaction::{NewTransaction, Transaction, TransactionStatus};

#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    rows: Mutex<HashMap<Uuid, Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<Uuid, Transaction>>> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn create(&self, new: NewTransaction) -> StoreResult<Transaction> {
        let mut rows = self.lock()?;
        if rows.contains_key(&new.transaction_id) {
            return Err(StoreError::Duplicate {
                transaction_id: new.transaction_id.to_string(),
            });
        }
        let tx = Transaction::pending(new, Utc::now());
        rows.insert(tx.transaction_id, tx.clone());
        Ok(tx)
    }

    async fn update_status(
        &self,
        transaction_id: Uuid,
        status: TransactionStatus,
    ) -> StoreResult<()> {
        let mut rows = self.lock()?;
        let tx = rows
            .get_mut(&transaction_id)
            .ok_or_else(|| StoreError::NotFound {
                transaction_id: transaction_id.to_string(),
            })?;
        tx.status = status;
        tx.updated_at = Utc::now();
        Ok(())
    }

    async fn get_by_id(&self, transaction_id: Uuid) -> StoreResult<Option<Transaction>> {
        Ok(self.lock()?.get(&transaction_id).cloned())
    }

    async fn probe(&self) -> StoreResult<StoreProbe> {
        let count = self.lock()?.len();
        Ok(StoreProbe {
            current_time: Utc::now(),
            transaction_count: count as i64,
        })
    }

    fn pool_status(&self) -> PoolStatus {
        PoolStatus { size: 1, idle: 1 }
    }
}
