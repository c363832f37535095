//! # Credential Checks
//!
//! Optional bearer-token or API-key check in front of the `/api` routes.
//! Disabled unless `AUTH_MODE` says otherwise.

use crate::handlers::ErrorResponse;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use compra_core::PurchaseError;
use std::sync::Arc;
use tracing::warn;

/// Header carrying the API key in `api_key` mode
pub const API_KEY_HEADER: &str = "x-api-key";

/// How callers of `/api` prove who they are
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CredentialStrategy {
    /// No check
    #[default]
    Disabled,
    /// `Authorization: Bearer <token>`
    BearerToken(String),
    /// `x-api-key: <key>`
    ApiKey(String),
}

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    MissingToken,
    InvalidToken,
    InvalidApiKey,
}

impl CredentialFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidApiKey => StatusCode::UNAUTHORIZED,
            Self::InvalidToken => StatusCode::FORBIDDEN,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::MissingToken => ErrorResponse::new("Authentication required", "No token provided"),
            Self::InvalidToken => ErrorResponse::new("Invalid token", "Authentication failed"),
            Self::InvalidApiKey => ErrorResponse::new("Invalid API key", "Valid API key required"),
        }
    }
}

impl IntoResponse for CredentialFailure {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_error_response())).into_response()
    }
}

impl CredentialStrategy {
    /// Build from `AUTH_MODE` plus the matching secret.
    ///
    /// A mode without its secret is a configuration error rather than a
    /// silently open API.
    pub fn from_settings(
        mode: Option<&str>,
        token: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, PurchaseError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        match mode.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("disabled") | Some("none") => Ok(Self::Disabled),
            Some("token") | Some("bearer") => non_empty(token)
                .map(Self::BearerToken)
                .ok_or_else(|| {
                    PurchaseError::Configuration("AUTH_MODE=token requires API_TOKEN".to_string())
                }),
            Some("api_key") | Some("apikey") => non_empty(api_key)
                .map(Self::ApiKey)
                .ok_or_else(|| {
                    PurchaseError::Configuration("AUTH_MODE=api_key requires API_KEY".to_string())
                }),
            Some(other) => Err(PurchaseError::Configuration(format!(
                "Unknown AUTH_MODE: {}",
                other
            ))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Check request headers against the configured credential
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), CredentialFailure> {
        match self {
            Self::Disabled => Ok(()),
            Self::BearerToken(expected) => {
                let token = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(' ').nth(1))
                    .filter(|t| !t.is_empty())
                    .ok_or(CredentialFailure::MissingToken)?;

                if constant_time_compare(token, expected) {
                    Ok(())
                } else {
                    Err(CredentialFailure::InvalidToken)
                }
            }
            Self::ApiKey(expected) => {
                let key = headers
                    .get(API_KEY_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(CredentialFailure::InvalidApiKey)?;

                if constant_time_compare(key, expected) {
                    Ok(())
                } else {
                    Err(CredentialFailure::InvalidApiKey)
                }
            }
        }
    }
}

/// Middleware rejecting requests that fail the credential check
pub async fn require_credentials(
    State(strategy): State<Arc<CredentialStrategy>>,
    request: Request,
    next: Next,
) -> Response {
    match strategy.verify(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(failure) => {
            warn!(
                path = %request.uri().path(),
                reason = ?failure,
                "Rejected unauthenticated request"
            );
            failure.into_response()
        }
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
