//! # Payment Gateway Trait
//!
//! Seam between the purchase workflow and the external payment processor.
//! The workflow only sees `GatewayRequest` and `GatewayResult`; wire format,
//! base URL and timeouts belong to the implementation.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │        PaymentGateway (trait)            │
//! │  ├── send_payment()                      │
//! │  ├── test_connection()                   │
//! │  └── base_url() / endpoint_path()        │
//! └──────────────────────────────────────────┘
//!                     ▲
//!          ┌──────────┴──────────┐
//!  ┌───────┴────────┐   ┌────────┴───────┐
//!  │ HttpPayment    │   │  test doubles  │
//!  │   Gateway      │   │                │
//!  └────────────────┘   └────────────────┘
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::request::{PurchaseRequest, DEFAULT_ACCOUNT_ID, DEFAULT_BANK_ID};
use crate::transaction::CustomerId;

/// Payment details forwarded upstream
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    pub transaction_id: Uuid,
    pub customer_id: CustomerId,
    pub amount: Decimal,
    pub bank_id: u64,
    pub account_id: u64,
}

impl GatewayRequest {
    pub fn from_purchase(transaction_id: Uuid, purchase: &PurchaseRequest) -> Self {
        Self {
            transaction_id,
            customer_id: purchase.customer_id.clone(),
            amount: purchase.amount,
            bank_id: purchase.bank_id,
            account_id: purchase.account_id,
        }
    }

    /// Fixed probe payload with a fresh id
    pub fn sample() -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            customer_id: CustomerId::sample(),
            amount: Decimal::new(10000, 2),
            bank_id: DEFAULT_BANK_ID,
            account_id: DEFAULT_ACCOUNT_ID,
        }
    }
}

/// Normalized outcome of one gateway call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResult {
    /// True only for a 2xx response
    pub success: bool,
    /// Upstream HTTP status, or 500 when no response was received
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GatewayResult {
    pub fn accepted(status: u16, data: Option<Value>) -> Self {
        Self {
            success: true,
            status,
            data,
            error: None,
        }
    }

    pub fn rejected(status: u16, error: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: false,
            status,
            data,
            error: Some(error.into()),
        }
    }
}

/// External payment processor.
///
/// Implementations never return an error: every transport failure, timeout
/// and non-2xx answer is folded into a `GatewayResult` with `success: false`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Forward one payment
    async fn send_payment(&self, request: &GatewayRequest) -> GatewayResult;

    /// Probe the upstream with a fixed sample payment
    async fn test_connection(&self) -> GatewayResult {
        self.send_payment(&GatewayRequest::sample()).await
    }

    /// Configured base URL (for diagnostics)
    fn base_url(&self) -> &str;

    /// Path of the payment endpoint under the base URL
    fn endpoint_path(&self) -> &str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_sample_request() {
        let a = GatewayRequest::sample();
        let b = GatewayRequest::sample();

        assert_ne!(a.transaction_id, b.transaction_id);
        assert_eq!(a.customer_id.as_str(), "1001");
        assert_eq!(a.amount, Decimal::from_str("100.00").unwrap());
        assert_eq!(a.bank_id, 1);
        assert_eq!(a.account_id, 12345);
    }

    #[test]
    fn test_result_serialization_skips_empty_fields() {
        let ok = GatewayResult::accepted(200, Some(serde_json::json!({"ok": true})));
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());

        let failed = GatewayResult::rejected(500, "timeout", None);
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["error"], "timeout");
        assert!(json.get("data").is_none());
    }
}
