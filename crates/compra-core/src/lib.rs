//! # compra-core
//!
//! Core types, traits and the purchase workflow for compra-rs.
//!
//! This crate provides:
//! - `Transaction` and `TransactionStatus`, the persisted purchase record
//! - `PurchaseInput` validation into a typed `PurchaseRequest`
//! - `PaymentGateway` trait for the upstream payment processor
//! - `TransactionStore` trait plus an in-memory implementation
//! - `PurchaseWorkflow`, which ties validation, store and gateway together
//! - `PurchaseError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use compra_core::{PurchaseInput, PurchaseWorkflow};
//!
//! let workflow = PurchaseWorkflow::new(store, gateway);
//! let outcome = workflow.create_purchase(&PurchaseInput::new("1001", 100.0)).await?;
//!
//! if outcome.is_accepted() {
//!     // transaction is PROCESSING
//! }
//! ```

pub mod error;
pub mod gateway;
pub mod memory;
pub mod request;
pub mod store;
pub mod transaction;
pub mod workflow;

// Re-exports for convenience
pub use error::{PurchaseError, PurchaseResult, StoreError, StoreResult, ValidationError};
pub use gateway::{GatewayRequest, GatewayResult, PaymentGateway, SharedPaymentGateway};
pub use memory::InMemoryTransactionStore;
pub use request::{PurchaseInput, PurchaseRequest};
pub use store::{PoolStatus, SharedTransactionStore, StoreProbe, TransactionStore};
pub use transaction::{CustomerId, NewTransaction, Transaction, TransactionStatus};
pub use workflow::{PurchaseOutcome, PurchaseWorkflow};
