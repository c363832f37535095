//! # HTTP Payment Gateway
//!
//! `PaymentGateway` implementation that POSTs to the upstream processor.

use crate::config::GatewayConfig;
use crate::payload::{parse_body, GatewayPayload};
use async_trait::async_trait;
use compra_core::{GatewayRequest, GatewayResult, PaymentGateway, PurchaseError, PurchaseResult};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::{debug, error, info, instrument};

/// Status reported when no HTTP response was received
const NO_RESPONSE_STATUS: u16 = 500;

/// Gateway client over `reqwest`.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    config: GatewayConfig,
    client: Client,
}

impl HttpPaymentGateway {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> PurchaseResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PurchaseError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PurchaseResult<Self> {
        let config = GatewayConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[instrument(skip(self, request), fields(transaction_id = %request.transaction_id))]
    async fn send_payment(&self, request: &GatewayRequest) -> GatewayResult {
        let payload = GatewayPayload::from_request(request);
        let url = self.config.payment_url();

        debug!(
            "Sending to payment gateway: url={}, id_usuario={}, monto={}",
            url, payload.id_usuario, payload.monto
        );

        let mut builder = self
            .client
            .post(&url)
            .header("X-Request-ID", request.transaction_id.to_string())
            .json(&payload);

        if let Some(auth) = self.config.auth_header() {
            builder = builder.header(AUTHORIZATION, auth);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.is_timeout() {
                    format!(
                        "timeout of {}ms exceeded",
                        self.config.timeout.as_millis()
                    )
                } else {
                    e.to_string()
                };
                error!("Payment gateway unreachable: {}", message);
                return GatewayResult::rejected(NO_RESPONSE_STATUS, message, None);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read payment gateway response: {}", e);
                return GatewayResult::rejected(status.as_u16(), e.to_string(), None);
            }
        };
        let data = parse_body(&body);

        if status.is_success() {
            info!("Payment gateway response status: {}", status);
            GatewayResult::accepted(status.as_u16(), data)
        } else {
            error!("Payment gateway error: status={}, body={}", status, body);
            GatewayResult::rejected(
                status.as_u16(),
                format!("Request failed with status code {}", status.as_u16()),
                data,
            )
        }
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint_path(&self) -> &str {
        &self.config.payment_path
    }
}
