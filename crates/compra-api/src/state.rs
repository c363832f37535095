//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the purchase workflow (store + gateway) and configuration.

use crate::auth::CredentialStrategy;
use compra_core::{PurchaseError, PurchaseWorkflow};
use std::env;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    /// Length of a rate-limit window
    pub rate_limit_window: Duration,
    /// Requests allowed per client per window; 0 disables limiting
    pub rate_limit_max: u64,
    /// Credential check applied to `/api` routes
    pub auth: CredentialStrategy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            cors_origins: Vec::new(),
            rate_limit_window: Duration::from_secs(15 * 60),
            rate_limit_max: 100,
            auth: CredentialStrategy::Disabled,
        }
    }
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, PurchaseError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let cors_origins = env::var("FRONTEND_URL")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty() && origin != "*")
                    .collect()
            })
            .unwrap_or_default();

        let auth = CredentialStrategy::from_settings(
            env::var("AUTH_MODE").ok().as_deref(),
            env::var("API_TOKEN").ok(),
            env::var("API_KEY").ok(),
        )?;

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            cors_origins,
            rate_limit_window: Duration::from_secs(parse_var(
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window.as_secs(),
            )?),
            rate_limit_max: parse_var("RATE_LIMIT_MAX", defaults.rate_limit_max)?,
            auth,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, PurchaseError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| PurchaseError::Configuration(format!("{} has invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Purchase workflow (owns the store and gateway handles)
    pub workflow: PurchaseWorkflow,
    /// Application config
    pub config: AppConfig,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, workflow: PurchaseWorkflow) -> Self {
        Self {
            workflow,
            config,
            started_at: Instant::now(),
        }
    }

    /// Whether error responses may carry raw error details
    pub fn expose_details(&self) -> bool {
        !self.config.is_production()
    }
}
