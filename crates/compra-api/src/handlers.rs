//! # Request Handlers
//!
//! Axum request handlers for the purchase API.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use compra_core::{
    GatewayResult, PurchaseError, PurchaseInput, PurchaseOutcome, TransactionStatus,
    ValidationError,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::any::Any;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Every route the service answers, as listed in the 404 body
pub const AVAILABLE_ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /health",
    "POST /api/compra",
    "GET /api/transaction/:transactionId",
    "GET /api/test/payment-gateway",
    "POST /api/test/payment-gateway",
    "GET /api/test/database",
    "GET /api/test/status",
];

// =============================================================================
// Request/Response Types
// =============================================================================

/// Purchase details returned to the caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseData {
    pub transaction_id: Uuid,
    pub cedula: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub timestamp: String,
    pub payment_gateway: GatewayResult,
}

/// Create purchase response (201 and 502)
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
    pub data: PurchaseData,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<PurchaseOutcome> for PurchaseResponse {
    fn from(outcome: PurchaseOutcome) -> Self {
        let accepted = outcome.is_accepted();
        let tx = outcome.transaction;

        Self {
            success: accepted,
            error: (!accepted).then(|| "Payment gateway error".to_string()),
            message: if accepted {
                "Transaction is being processed by payment gateway".to_string()
            } else {
                "Payment gateway rejected the transaction".to_string()
            },
            data: PurchaseData {
                transaction_id: tx.transaction_id,
                cedula: tx.customer_id.to_string(),
                amount: tx.amount,
                status: tx.status,
                timestamp: Utc::now().to_rfc3339(),
                payment_gateway: outcome.gateway,
            },
            warnings: outcome.warnings,
        }
    }
}

/// Transaction lookup data
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    pub transaction_id: Uuid,
    pub cedula: String,
    pub status: TransactionStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Transaction lookup response
#[derive(Debug, Serialize)]
pub struct TransactionStatusResponse {
    pub success: bool,
    pub message: String,
    pub data: TransactionData,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a workflow error onto the JSON error envelope.
///
/// `internal_message` is shown for 5xx errors; the raw error is attached as
/// `details` only when `expose_details` is set.
pub fn purchase_error_to_response(
    err: PurchaseError,
    internal_message: &str,
    expose_details: bool,
) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let response = match &err {
        PurchaseError::Validation(v) => ErrorResponse::new(v.title(), v.to_string()),
        PurchaseError::NotFound { .. } => ErrorResponse::new(err.title(), err.to_string()),
        _ => {
            let response = ErrorResponse::new(err.title(), internal_message);
            if expose_details {
                response.with_details(err.to_string())
            } else {
                response
            }
        }
    };

    (status, Json(response))
}

/// Turn a body decoding failure into a 400
pub fn rejection_to_response(rejection: JsonRejection) -> ApiError {
    purchase_error_to_response(
        ValidationError::MalformedBody(rejection.body_text()).into(),
        "",
        false,
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": "compra-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
    }))
}

/// API index
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let gateway = state.workflow.gateway();
    Json(serde_json::json!({
        "message": "E-commerce Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "purchase": "POST /api/compra",
            "transaction_status": "GET /api/transaction/:transactionId",
            "test_payment_gateway": "GET /api/test/payment-gateway",
            "test_payment_gateway_custom": "POST /api/test/payment-gateway",
            "test_database": "GET /api/test/database",
            "test_system_status": "GET /api/test/status"
        },
        "payment_gateway": {
            "url": gateway.base_url(),
            "endpoint": gateway.endpoint_path()
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Create a purchase: validate, record, forward to the gateway, finalize
#[instrument(skip(state, payload))]
pub async fn create_purchase(
    State(state): State<AppState>,
    payload: Result<Json<PurchaseInput>, JsonRejection>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    let Json(input) = payload.map_err(rejection_to_response)?;

    let outcome = state.workflow.create_purchase(&input).await.map_err(|e| {
        match &e {
            PurchaseError::Validation(v) => warn!("Rejected purchase: {}", v),
            _ => error!("Purchase creation failed: {}", e),
        }
        purchase_error_to_response(
            e,
            "Failed to create purchase transaction",
            state.expose_details(),
        )
    })?;

    let status = if outcome.is_accepted() {
        StatusCode::CREATED
    } else {
        StatusCode::BAD_GATEWAY
    };

    info!(
        transaction_id = %outcome.transaction.transaction_id,
        status = %outcome.transaction.status,
        "Purchase finished"
    );

    Ok((status, Json(PurchaseResponse::from(outcome))))
}

/// Look up a transaction's current status
#[instrument(skip(state))]
pub async fn get_transaction_status(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionStatusResponse>, ApiError> {
    let tx = state
        .workflow
        .get_transaction_status(&transaction_id)
        .await
        .map_err(|e| {
            if !matches!(e, PurchaseError::NotFound { .. }) {
                error!("Failed to get transaction status: {}", e);
            }
            purchase_error_to_response(
                e,
                "Failed to retrieve transaction status",
                state.expose_details(),
            )
        })?;

    Ok(Json(TransactionStatusResponse {
        success: true,
        message: "Transaction found".to_string(),
        data: TransactionData {
            transaction_id: tx.transaction_id,
            cedula: tx.customer_id.to_string(),
            status: tx.status,
            amount: tx.amount,
        },
    }))
}

/// Fallback for unmatched routes
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "error": "Route not found",
            "path": uri.to_string(),
            "method": method.as_str(),
            "available_endpoints": AVAILABLE_ENDPOINTS,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// 500 envelope for a panic caught by the middleware stack
pub fn panic_response(panic: Box<dyn Any + Send + 'static>, expose_details: bool) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };
    error!("Unexpected error: {}", detail);

    let message = if expose_details {
        detail
    } else {
        "Something went wrong".to_string()
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal server error", message)),
    )
        .into_response()
}
