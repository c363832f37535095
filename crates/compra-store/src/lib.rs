//! # compra-store
//!
//! PostgreSQL implementation of `compra_core::TransactionStore`.
//!
//! The store owns a bounded `sqlx` pool. It is built once at process start,
//! handed to the purchase workflow as a shared trait object, and closed on
//! shutdown.
//!
//! ```rust,ignore
//! use compra_store::{DatabaseConfig, PgTransactionStore};
//!
//! let store = PgTransactionStore::connect(&DatabaseConfig::from_env()?).await?;
//! ```

pub mod config;
pub mod postgres;

pub use config::DatabaseConfig;
pub use postgres::PgTransactionStore;
