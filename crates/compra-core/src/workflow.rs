//! # Purchase Workflow
//!
//! One pass per purchase request, strictly ordered:
//!
//! ```text
//! validate ──► create (PENDING) ──► forward to gateway ──► finalize ──► outcome
//!    │               │                                        │
//!    ▼               ▼                                        ▼
//! Validation      Store error                     PROCESSING | FAILED
//!  (400)           (500)                        (update failure = warning)
//! ```
//!
//! No retries and no continuation after the outcome is returned.

use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{PurchaseError, PurchaseResult};
use crate::gateway::{GatewayRequest, GatewayResult, SharedPaymentGateway};
use crate::request::PurchaseInput;
use crate::store::SharedTransactionStore;
use crate::transaction::{NewTransaction, Transaction, TransactionStatus};

/// Result of a completed purchase attempt
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOutcome {
    /// Transaction with its final status applied
    pub transaction: Transaction,
    /// Normalized gateway answer
    pub gateway: GatewayResult,
    /// Non-fatal problems, e.g. a status update that could not be persisted
    pub warnings: Vec<String>,
}

impl PurchaseOutcome {
    /// True when the gateway accepted the payment
    pub fn is_accepted(&self) -> bool {
        self.gateway.success
    }
}

/// Orchestrates the store and the gateway for purchases.
///
/// Both collaborators are injected; cloning the workflow shares them.
#[derive(Clone)]
pub struct PurchaseWorkflow {
    store: SharedTransactionStore,
    gateway: SharedPaymentGateway,
}

impl PurchaseWorkflow {
    pub fn new(store: SharedTransactionStore, gateway: SharedPaymentGateway) -> Self {
        Self { store, gateway }
    }

    pub fn store(&self) -> &SharedTransactionStore {
        &self.store
    }

    pub fn gateway(&self) -> &SharedPaymentGateway {
        &self.gateway
    }

    /// Validate, record, forward and finalize one purchase
    #[instrument(skip(self, input))]
    pub async fn create_purchase(&self, input: &PurchaseInput) -> PurchaseResult<PurchaseOutcome> {
        let request = input.validate()?;

        let new = NewTransaction::new(request.customer_id.clone(), request.amount);
        info!(
            transaction_id = %new.transaction_id,
            cedula = %new.customer_id,
            amount = %new.amount,
            "Creating transaction"
        );

        let mut transaction = self.store.create(new).await.map_err(|e| {
            error!("Failed to create transaction record: {}", e);
            PurchaseError::from(e)
        })?;
        let transaction_id = transaction.transaction_id;

        let gateway_request = GatewayRequest::from_purchase(transaction_id, &request);
        let gateway = self.gateway.send_payment(&gateway_request).await;

        if !gateway.success {
            warn!(
                transaction_id = %transaction_id,
                status = gateway.status,
                error = gateway.error.as_deref().unwrap_or(""),
                "Payment gateway rejected the transaction"
            );
        }

        let final_status = TransactionStatus::after_gateway(gateway.success);
        let mut warnings = Vec::new();

        match self.store.update_status(transaction_id, final_status).await {
            Ok(()) => {
                info!(transaction_id = %transaction_id, status = %final_status, "Transaction status updated");
            }
            Err(e) => {
                error!(
                    transaction_id = %transaction_id,
                    status = %final_status,
                    "Failed to persist final transaction status: {}", e
                );
                warnings.push(format!(
                    "Transaction status could not be updated to {}: {}",
                    final_status, e
                ));
            }
        }
        transaction.status = final_status;

        Ok(PurchaseOutcome {
            transaction,
            gateway,
            warnings,
        })
    }

    /// Look up a transaction by id.
    ///
    /// Ids that are not UUIDs cannot exist and report `NotFound`.
    #[instrument(skip(self))]
    pub async fn get_transaction_status(&self, transaction_id: &str) -> PurchaseResult<Transaction> {
        let not_found = || PurchaseError::NotFound {
            transaction_id: transaction_id.to_string(),
        };

        let id = Uuid::parse_str(transaction_id).map_err(|_| not_found())?;
        self.store.get_by_id(id).await?.ok_or_else(not_found)
    }
}
