//! # compra-gateway
//!
//! Client for the external payment gateway ("pasarela").
//!
//! All knowledge of the upstream lives here: base URL, endpoint path,
//! timeout, authentication header and the renamed wire fields. The rest of
//! the system talks to it through `compra_core::PaymentGateway`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use compra_gateway::HttpPaymentGateway;
//! use compra_core::{GatewayRequest, PaymentGateway};
//!
//! let gateway = HttpPaymentGateway::from_env()?;
//! let result = gateway.send_payment(&request).await;
//!
//! if !result.success {
//!     // result.status / result.error / result.data describe the failure
//! }
//! ```

pub mod client;
pub mod config;
pub mod payload;

// Re-exports
pub use client::HttpPaymentGateway;
pub use config::GatewayConfig;
pub use payload::GatewayPayload;
