//! # Gateway Wire Format
//!
//! The upstream gateway expects Spanish field names. All renaming between the
//! internal `GatewayRequest` and the wire body happens in
//! [`GatewayPayload::from_request`]:
//!
//! | internal      | wire         |
//! |---------------|--------------|
//! | `customer_id` | `id_usuario` |
//! | `bank_id`     | `id_banco`   |
//! | `account_id`  | `id_cuenta`  |
//! | `amount`      | `monto`      |
//!
//! The transaction id travels in the `X-Request-ID` header, not in the body.

use compra_core::GatewayRequest;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// JSON body of `POST {base_url}/payment/process`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayPayload {
    pub id_usuario: String,
    pub id_banco: u64,
    pub id_cuenta: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub monto: Decimal,
}

impl GatewayPayload {
    pub fn from_request(request: &GatewayRequest) -> Self {
        Self {
            id_usuario: request.customer_id.as_str().to_string(),
            id_banco: request.bank_id,
            id_cuenta: request.account_id,
            monto: request.amount,
        }
    }
}

/// Decode a response body: JSON when possible, raw text otherwise
pub(crate) fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}
