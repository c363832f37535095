//! # Diagnostic Endpoints
//!
//! `/api/test/*` probes for the upstream gateway, the database and the
//! running process. None of them touch the `transactions` table except to
//! count it.

use crate::handlers::{purchase_error_to_response, ApiError};
use crate::state::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use compra_core::{GatewayRequest, PurchaseError, PurchaseInput, ValidationError};
use serde_json::json;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Probe the gateway with the fixed sample payment
#[instrument(skip(state))]
pub async fn probe_gateway(State(state): State<AppState>) -> impl IntoResponse {
    info!("Testing payment gateway connection");

    let gateway = state.workflow.gateway();
    let result = gateway.test_connection().await;

    let gateway_info = json!({
        "url": gateway.base_url(),
        "status": result.status,
        "response": result.data,
    });

    if result.success {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Payment gateway is reachable and responding",
                "gateway": gateway_info,
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
    } else {
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "success": false,
                "message": "Payment gateway connection failed",
                "error": result.error,
                "gateway": gateway_info,
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
    }
}

/// Probe the gateway with caller-supplied data; absent fields use the sample
#[instrument(skip(state, body))]
pub async fn probe_gateway_custom(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let input: PurchaseInput = if body.iter().all(u8::is_ascii_whitespace) {
        PurchaseInput::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            purchase_error_to_response(
                ValidationError::MalformedBody(e.to_string()).into(),
                "",
                false,
            )
        })?
    };
    let input = input.with_sample_defaults();

    let request = input
        .validate()
        .map_err(|e| purchase_error_to_response(PurchaseError::from(e), "", false))?;

    info!("Testing payment gateway with custom data");

    let transaction_id = Uuid::new_v4();
    let result = state
        .workflow
        .gateway()
        .send_payment(&GatewayRequest::from_purchase(transaction_id, &request))
        .await;

    let (status, message) = if result.success {
        (StatusCode::OK, "Payment gateway test successful")
    } else {
        (StatusCode::BAD_GATEWAY, "Payment gateway test failed")
    };

    Ok((
        status,
        Json(json!({
            "success": result.success,
            "message": message,
            "test": {
                "transactionId": transaction_id,
                "input": input,
                "gateway_response": result,
            },
            "timestamp": Utc::now().to_rfc3339(),
        })),
    ))
}

/// Probe the database: server time, row count and pool usage
#[instrument(skip(state))]
pub async fn probe_database(State(state): State<AppState>) -> impl IntoResponse {
    info!("Testing database connection");

    let store = state.workflow.store();
    match store.probe().await {
        Ok(probe) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Database connection successful",
                "database": {
                    "current_time": probe.current_time.to_rfc3339(),
                    "transaction_count": probe.transaction_count,
                    "pool": store.pool_status(),
                },
                "timestamp": Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => {
            error!("Database test error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "message": "Database connection failed",
                    "error": e.to_string(),
                    "timestamp": Utc::now().to_rfc3339(),
                })),
            )
        }
    }
}

/// Process and runtime status
pub async fn system_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "E-commerce backend is running",
        "system": {
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.config.environment,
            "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
            "pid": std::process::id(),
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "payment_gateway_url": state.workflow.gateway().base_url(),
        },
        "endpoints": {
            "health": "/health",
            "create_purchase": "POST /api/compra",
            "get_transaction": "GET /api/transaction/:transactionId",
            "test_payment_gateway": "GET /api/test/payment-gateway",
            "test_payment_gateway_custom": "POST /api/test/payment-gateway",
            "test_database": "GET /api/test/database"
        },
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
