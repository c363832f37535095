//! # Transaction Types
//!
//! The persisted purchase record and its status lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::request::SAMPLE_CUSTOMER_ID;

/// Lifecycle status of a transaction.
///
/// ```text
/// PENDING ──► PROCESSING ──► COMPLETED (gateway callback, external)
///    │
///    └──────► FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Processing,
    Failed,
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Processing => "PROCESSING",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(s: &str) -> Option<TransactionStatus> {
        match s {
            "PENDING" => Some(TransactionStatus::Pending),
            "PROCESSING" => Some(TransactionStatus::Processing),
            "FAILED" => Some(TransactionStatus::Failed),
            "COMPLETED" => Some(TransactionStatus::Completed),
            _ => None,
        }
    }

    /// Status a pending transaction moves to once the gateway has answered
    pub fn after_gateway(accepted: bool) -> Self {
        if accepted {
            TransactionStatus::Processing
        } else {
            TransactionStatus::Failed
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longest `Cedula` the `VARCHAR(255)` column holds
pub const MAX_CUSTOMER_ID_LEN: usize = 255;

/// Customer identifier (the `Cedula`): a non-empty string of ASCII digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty()
            || raw.len() > MAX_CUSTOMER_ID_LEN
            || !raw.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ValidationError::InvalidCedula);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn sample() -> Self {
        Self(SAMPLE_CUSTOMER_ID.to_string())
    }
}

impl TryFrom<String> for CustomerId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CustomerId> for String {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields required to insert a new transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_id: Uuid,
    pub customer_id: CustomerId,
    pub amount: Decimal,
}

impl NewTransaction {
    /// Build with a freshly generated id
    pub fn new(customer_id: CustomerId, amount: Decimal) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            customer_id,
            amount,
        }
    }
}

/// One purchase attempt as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: Uuid,
    pub customer_id: CustomerId,
    pub status: TransactionStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// A fresh PENDING row for `new`, stamped with `now`
    pub fn pending(new: NewTransaction, now: DateTime<Utc>) -> Self {
        Self {
            transaction_id: new.transaction_id,
            customer_id: new.customer_id,
            status: TransactionStatus::Pending,
            amount: new.amount,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_roundtrip_strings() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Processing,
            TransactionStatus::Failed,
            TransactionStatus::Completed,
        ] {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TransactionStatus::parse("pending"), None);
    }

    #[test]
    fn test_status_after_gateway() {
        assert_eq!(
            TransactionStatus::after_gateway(true),
            TransactionStatus::Processing
        );
        assert_eq!(
            TransactionStatus::after_gateway(false),
            TransactionStatus::Failed
        );
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&TransactionStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");
    }

    #[test]
    fn test_customer_id_validation() {
        assert!(CustomerId::parse("1001").is_ok());
        assert_eq!(
            CustomerId::parse("10a1"),
            Err(ValidationError::InvalidCedula)
        );
        assert_eq!(CustomerId::parse(""), Err(ValidationError::InvalidCedula));
        assert_eq!(
            CustomerId::parse("-12"),
            Err(ValidationError::InvalidCedula)
        );

        assert!(CustomerId::parse("7".repeat(MAX_CUSTOMER_ID_LEN)).is_ok());
        assert_eq!(
            CustomerId::parse("7".repeat(MAX_CUSTOMER_ID_LEN + 1)),
            Err(ValidationError::InvalidCedula)
        );
    }

    #[test]
    fn test_status_defaults_to_pending() {
        assert_eq!(TransactionStatus::default(), TransactionStatus::Pending);
    }

    #[test]
    fn test_pending_transaction() {
        let new = NewTransaction::new(
            CustomerId::parse("1001").unwrap(),
            Decimal::from_str("100.00").unwrap(),
        );
        let id = new.transaction_id;
        let tx = Transaction::pending(new, Utc::now());

        assert_eq!(tx.transaction_id, id);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.created_at, tx.updated_at);
    }

    #[test]
    fn test_transaction_amount_serializes_as_number() {
        let new = NewTransaction::new(
            CustomerId::parse("1001").unwrap(),
            Decimal::from_str("12.50").unwrap(),
        );
        let tx = Transaction::pending(new, Utc::now());
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["amount"], serde_json::json!(12.5));
        assert_eq!(json["customerId"], "1001");
        assert_eq!(json["status"], "PENDING");
    }
}
