//! # compra-api
//!
//! HTTP API layer for compra-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The purchase and transaction-status endpoints
//! - Diagnostic probes for the gateway and database
//! - Optional credential checks and per-client rate limiting
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | API index |
//! | GET | `/health` | Health check |
//! | POST | `/api/compra` | Create purchase |
//! | GET | `/api/transaction/:id` | Transaction status |
//! | GET | `/api/test/payment-gateway` | Gateway probe (sample data) |
//! | POST | `/api/test/payment-gateway` | Gateway probe (custom data) |
//! | GET | `/api/test/database` | Database probe |
//! | GET | `/api/test/status` | Process status |

pub mod auth;
pub mod diagnostics;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use auth::CredentialStrategy;
pub use routes::create_router;
pub use state::{AppConfig, AppState};
