//! # PostgreSQL Transaction Store
//!
//! `TransactionStore` over a bounded `sqlx` pool. The table layout matches
//! the deployed `transactions` table; unquoted identifiers fold to lower case,
//! which is why the row struct uses `transactionid`, `estado_trans`, etc.

use crate::config::DatabaseConfig;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use compra_core::{
    CustomerId, NewTransaction, PoolStatus, PurchaseResult, StoreError, StoreProbe, StoreResult,
    Transaction, TransactionStatus, TransactionStore,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    TransactionId VARCHAR(255) PRIMARY KEY,
    Cedula VARCHAR(255) NOT NULL,
    Estado_trans VARCHAR(50) NOT NULL DEFAULT 'PENDING',
    Precio_total DECIMAL(10, 2) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
"#;

const COLUMNS: &str = "TransactionId, Cedula, Estado_trans, Precio_total, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    transactionid: String,
    cedula: String,
    estado_trans: String,
    precio_total: Decimal,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let transaction_id = Uuid::parse_str(&row.transactionid).map_err(|_| {
            StoreError::Corrupt(format!("transaction id is not a UUID: {}", row.transactionid))
        })?;
        let customer_id = CustomerId::parse(row.cedula.as_str()).map_err(|_| {
            StoreError::Corrupt(format!("cedula is not numeric: {}", row.cedula))
        })?;
        let status = TransactionStatus::parse(&row.estado_trans).ok_or_else(|| {
            StoreError::Corrupt(format!("unknown status: {}", row.estado_trans))
        })?;

        Ok(Transaction {
            transaction_id,
            customer_id,
            status,
            amount: row.precio_total,
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }
}

fn to_utc(ts: Option<NaiveDateTime>) -> DateTime<Utc> {
    ts.map(|t| t.and_utc()).unwrap_or_default()
}

/// Classify a driver error
fn store_error(err: sqlx::Error, transaction_id: Option<&Uuid>) -> StoreError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate {
            transaction_id: transaction_id.map(Uuid::to_string).unwrap_or_default(),
        },
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

/// PostgreSQL-backed store. Cloning shares the pool.
#[derive(Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the pool, ensure the table exists and verify connectivity
    pub async fn connect(config: &DatabaseConfig) -> PurchaseResult<Self> {
        let options = config.connect_options()?;
        info!("Connecting to PostgreSQL at {}", config.describe());

        let pool = config
            .pool_options()
            .connect_with(options)
            .await
            .map_err(|e| store_error(e, None))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;

        let probe = store.probe().await?;
        info!(
            "Connected to PostgreSQL, database time: {}, transactions: {}",
            probe.current_time, probe.transaction_count
        );

        Ok(store)
    }

    /// Create the `transactions` table if missing
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.timed("create_table", sqlx::query(CREATE_TABLE).execute(&self.pool))
            .await
            .map_err(|e| store_error(e, None))?;
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn timed<T, F>(&self, label: &'static str, query: F) -> Result<T, sqlx::Error>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let start = Instant::now();
        let result = query.await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => debug!(query = label, elapsed_ms, "Query executed"),
            Err(e) => error!(query = label, elapsed_ms, "Query failed: {}", e),
        }
        result
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn create(&self, new: NewTransaction) -> StoreResult<Transaction> {
        let sql = format!(
            "INSERT INTO transactions (TransactionId, Cedula, Estado_trans, Precio_total) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            COLUMNS
        );

        let row = self
            .timed(
                "insert_transaction",
                sqlx::query_as::<_, TransactionRow>(&sql)
                    .bind(new.transaction_id.to_string())
                    .bind(new.customer_id.as_str())
                    .bind(TransactionStatus::Pending.as_str())
                    .bind(new.amount)
                    .fetch_one(&self.pool),
            )
            .await
            .map_err(|e| store_error(e, Some(&new.transaction_id)))?;

        Transaction::try_from(row)
    }

    async fn update_status(
        &self,
        transaction_id: Uuid,
        status: TransactionStatus,
    ) -> StoreResult<()> {
        let result = self
            .timed(
                "update_status",
                sqlx::query(
                    "UPDATE transactions SET Estado_trans = $1, updated_at = CURRENT_TIMESTAMP \
                     WHERE TransactionId = $2",
                )
                .bind(status.as_str())
                .bind(transaction_id.to_string())
                .execute(&self.pool),
            )
            .await
            .map_err(|e| store_error(e, Some(&transaction_id)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                transaction_id: transaction_id.to_string(),
            });
        }
        Ok(())
    }

    async fn get_by_id(&self, transaction_id: Uuid) -> StoreResult<Option<Transaction>> {
        let sql = format!("SELECT {} FROM transactions WHERE TransactionId = $1", COLUMNS);

        let row = self
            .timed(
                "select_transaction",
                sqlx::query_as::<_, TransactionRow>(&sql)
                    .bind(transaction_id.to_string())
                    .fetch_optional(&self.pool),
            )
            .await
            .map_err(|e| store_error(e, Some(&transaction_id)))?;

        row.map(Transaction::try_from).transpose()
    }

    async fn probe(&self) -> StoreResult<StoreProbe> {
        let (current_time, transaction_count) = self
            .timed(
                "probe",
                sqlx::query_as::<_, (DateTime<Utc>, i64)>(
                    "SELECT NOW() AS server_time, COUNT(*) AS transaction_count FROM transactions",
                )
                .fetch_one(&self.pool),
            )
            .await
            .map_err(|e| store_error(e, None))?;

        Ok(StoreProbe {
            current_time,
            transaction_count,
        })
    }

    fn pool_status(&self) -> PoolStatus {
        PoolStatus {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
        }
    }
}
