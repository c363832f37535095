//! # Transaction Store Trait
//!
//! CRUD access to the `transactions` table. Every operation is a single
//! atomic statement; there are no multi-row invariants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::transaction::{NewTransaction, Transaction, TransactionStatus};

/// Result of the diagnostic store probe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreProbe {
    pub current_time: DateTime<Utc>,
    pub transaction_count: i64,
}

/// Connection pool snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Open connections (busy + idle)
    pub size: u32,
    pub idle: u32,
}

/// Persistence for transactions.
///
/// `update_status` on an unknown id is an error (`StoreError::NotFound`),
/// never a silent no-op.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Insert a PENDING row and return it as stored
    async fn create(&self, new: NewTransaction) -> StoreResult<Transaction>;

    /// Change the status of an existing row
    async fn update_status(&self, transaction_id: Uuid, status: TransactionStatus)
        -> StoreResult<()>;

    /// Read one row
    async fn get_by_id(&self, transaction_id: Uuid) -> StoreResult<Option<Transaction>>;

    /// Server time and row count
    async fn probe(&self) -> StoreResult<StoreProbe>;

    /// Pool usage, for status reporting
    fn pool_status(&self) -> PoolStatus;
}

/// Type alias for a shared store (dynamic dispatch)
pub type SharedTransactionStore = Arc<dyn TransactionStore>;
