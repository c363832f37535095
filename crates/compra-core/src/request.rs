//! # Purchase Requests
//!
//! Raw purchase input as it arrives over HTTP, and its validated form.
//! Clients send loosely typed JSON (`Cedula` may be a number or a string,
//! `Precio_total` may be a number or a numeric string), so the raw fields are
//! kept as `serde_json::Value` and checked here.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::transaction::CustomerId;

/// Bank used when the request does not name one
pub const DEFAULT_BANK_ID: u64 = 1;

/// Account used when the request does not name one
pub const DEFAULT_ACCOUNT_ID: u64 = 12345;

/// Customer used by gateway probes
pub const SAMPLE_CUSTOMER_ID: &str = "1001";

/// Largest amount a `DECIMAL(10, 2)` column accepts, exclusive
const MAX_AMOUNT: i64 = 100_000_000;

/// Purchase body as received
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseInput {
    #[serde(rename = "Cedula", default)]
    pub cedula: Option<Value>,
    #[serde(rename = "Precio_total", default)]
    pub precio_total: Option<Value>,
    #[serde(rename = "Bank", default)]
    pub bank: Option<Value>,
    #[serde(rename = "Cuenta", default)]
    pub cuenta: Option<Value>,
}

impl PurchaseInput {
    pub fn new(cedula: impl Into<Value>, precio_total: impl Into<Value>) -> Self {
        Self {
            cedula: Some(cedula.into()),
            precio_total: Some(precio_total.into()),
            bank: None,
            cuenta: None,
        }
    }

    /// Fill absent fields with the gateway probe sample values
    pub fn with_sample_defaults(mut self) -> Self {
        if is_absent(&self.cedula) {
            self.cedula = Some(Value::from(SAMPLE_CUSTOMER_ID));
        }
        if is_absent(&self.precio_total) {
            self.precio_total = Some(Value::from(100.0));
        }
        if is_absent(&self.bank) {
            self.bank = Some(Value::from(DEFAULT_BANK_ID));
        }
        if is_absent(&self.cuenta) {
            self.cuenta = Some(Value::from(DEFAULT_ACCOUNT_ID));
        }
        self
    }

    /// Check every field and produce a typed request.
    ///
    /// Presence is checked before format, so a body missing `Cedula` reports
    /// `MissingFields` even if `Precio_total` is also malformed.
    pub fn validate(&self) -> Result<PurchaseRequest, ValidationError> {
        if is_absent(&self.cedula) || is_absent(&self.precio_total) {
            return Err(ValidationError::MissingFields);
        }

        let customer_id = parse_customer_id(self.cedula.as_ref())?;
        let amount = parse_amount(self.precio_total.as_ref())?;
        let bank_id = parse_optional_id(self.bank.as_ref(), DEFAULT_BANK_ID)?;
        let account_id = parse_optional_id(self.cuenta.as_ref(), DEFAULT_ACCOUNT_ID)?;

        Ok(PurchaseRequest {
            customer_id,
            amount,
            bank_id,
            account_id,
        })
    }
}

/// A validated purchase
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRequest {
    pub customer_id: CustomerId,
    /// Positive, normalized to two decimal places
    pub amount: Decimal,
    pub bank_id: u64,
    pub account_id: u64,
}

fn is_absent(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

fn parse_customer_id(value: Option<&Value>) -> Result<CustomerId, ValidationError> {
    match value {
        Some(Value::String(s)) => CustomerId::parse(s.as_str()),
        Some(Value::Number(n)) => match (n.as_u64(), n.as_f64()) {
            (Some(digits), _) => CustomerId::parse(digits.to_string()),
            // 1001.0 and 1e3 arrive as floats
            (None, Some(f)) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => {
                CustomerId::parse(format!("{:.0}", f))
            }
            _ => Err(ValidationError::InvalidCedula),
        },
        _ => Err(ValidationError::InvalidCedula),
    }
}

fn parse_amount(value: Option<&Value>) -> Result<Decimal, ValidationError> {
    let raw = match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => return Err(ValidationError::InvalidPrice),
    };

    let amount = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| ValidationError::InvalidPrice)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    if amount <= Decimal::ZERO || amount >= Decimal::from(MAX_AMOUNT) {
        return Err(ValidationError::InvalidPrice);
    }
    Ok(amount)
}

fn parse_optional_id(value: Option<&Value>, default: u64) -> Result<u64, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n.as_u64().ok_or(ValidationError::InvalidBankDetails),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidBankDetails),
        _ => Err(ValidationError::InvalidBankDetails),
    }
}
