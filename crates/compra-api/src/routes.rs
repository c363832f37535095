//! # Routes
//!
//! Axum router configuration for the purchase API.

use crate::auth::{self, API_KEY_HEADER};
use crate::diagnostics;
use crate::handlers;
use crate::rate_limit::{self, RateLimiter};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the main application router
///
/// Routes:
/// - POST /api/compra - Create a purchase
/// - GET  /api/transaction/{transaction_id} - Transaction status
/// - GET  /api/test/payment-gateway - Probe gateway with sample data
/// - POST /api/test/payment-gateway - Probe gateway with custom data
/// - GET  /api/test/database - Probe database
/// - GET  /api/test/status - Process status
/// - GET  /health, GET / - Liveness and index
///
/// Anything else falls through to a JSON 404.
pub fn create_router(state: AppState) -> Router {
    let mut api_routes = Router::new()
        .route("/compra", post(handlers::create_purchase))
        .route(
            "/transaction/{transaction_id}",
            get(handlers::get_transaction_status),
        )
        .route(
            "/test/payment-gateway",
            get(diagnostics::probe_gateway).post(diagnostics::probe_gateway_custom),
        )
        .route("/test/database", get(diagnostics::probe_database))
        .route("/test/status", get(diagnostics::system_status));

    if state.config.auth.is_enabled() {
        info!("API authentication enabled");
        let strategy = Arc::new(state.config.auth.clone());
        api_routes = api_routes.route_layer(middleware::from_fn_with_state(
            strategy,
            auth::require_credentials,
        ));
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::index))
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    if state.config.rate_limit_max > 0 {
        let limiter = Arc::new(RateLimiter::new(
            state.config.rate_limit_window,
            state.config.rate_limit_max,
        ));
        router = router.layer(middleware::from_fn_with_state(limiter, rate_limit::enforce));
    }

    let expose_details = state.expose_details();

    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            handlers::panic_response(panic, expose_details)
        }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for configured origins, otherwise any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if allowed.is_empty() {
        return CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(API_KEY_HEADER),
        ])
        .allow_credentials(true)
}
