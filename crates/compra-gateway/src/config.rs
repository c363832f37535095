//! # Gateway Configuration
//!
//! Configuration for the upstream payment gateway.
//! Values are loaded from environment variables.

use compra_core::PurchaseError;
use std::env;
use std::time::Duration;

/// Default payment endpoint under the base URL
pub const DEFAULT_PAYMENT_PATH: &str = "/payment/process";

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Payment gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL, without trailing slash
    pub base_url: String,

    /// Payment endpoint path, with leading slash
    pub payment_path: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Optional bearer key sent as `Authorization`
    pub api_key: Option<String>,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYMENT_GATEWAY_URL`
    ///
    /// Optional:
    /// - `PAYMENT_GATEWAY_PATH` (default `/payment/process`)
    /// - `PAYMENT_GATEWAY_TIMEOUT_SECS` (default 30)
    /// - `PAYMENT_GATEWAY_API_KEY`
    pub fn from_env() -> Result<Self, PurchaseError> {
        dotenvy::dotenv().ok();

        let base_url = env::var("PAYMENT_GATEWAY_URL").map_err(|_| {
            PurchaseError::Configuration("PAYMENT_GATEWAY_URL not set".to_string())
        })?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(PurchaseError::Configuration(
                "PAYMENT_GATEWAY_URL must start with http:// or https://".to_string(),
            ));
        }

        let timeout_secs = match env::var("PAYMENT_GATEWAY_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                PurchaseError::Configuration(
                    "PAYMENT_GATEWAY_TIMEOUT_SECS must be a whole number of seconds".to_string(),
                )
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let mut config = Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs));

        if let Ok(path) = env::var("PAYMENT_GATEWAY_PATH") {
            config = config.with_payment_path(path);
        }

        if let Ok(key) = env::var("PAYMENT_GATEWAY_API_KEY") {
            if !key.is_empty() {
                config = config.with_api_key(key);
            }
        }

        Ok(config)
    }

    /// Create config with explicit base URL and defaults for the rest
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            payment_path: DEFAULT_PAYMENT_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
        }
    }

    /// Full URL of the payment endpoint
    pub fn payment_url(&self) -> String {
        format!("{}{}", self.base_url, self.payment_path)
    }

    /// Get authorization header value, if a key is configured
    pub fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| format!("Bearer {}", key))
    }

    /// Builder: set payment endpoint path
    pub fn with_payment_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.payment_path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: set bearer key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::new("https://pasarela.example.com/");
        assert_eq!(config.base_url, "https://pasarela.example.com");
        assert_eq!(
            config.payment_url(),
            "https://pasarela.example.com/payment/process"
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.auth_header().is_none());
    }

    #[test]
    fn test_builders() {
        let config = GatewayConfig::new("http://localhost:9000")
            .with_payment_path("charge")
            .with_api_key("secret")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.payment_url(), "http://localhost:9000/charge");
        assert_eq!(config.auth_header().as_deref(), Some("Bearer secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_env_missing_url() {
        env::remove_var("PAYMENT_GATEWAY_URL");

        let result = GatewayConfig::from_env();
        assert!(result.is_err());
    }
}
