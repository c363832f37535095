//! # Database Configuration
//!
//! Connection parameters and pool limits, loaded from environment variables.
//! `DATABASE_URL` wins over the individual `DB_*` parts when set.

use compra_core::PurchaseError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Database connection configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection string; overrides the parts below
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: PgSslMode,
    /// Pool size
    pub max_connections: u32,
    /// Idle connections are closed after this long
    pub idle_timeout: Duration,
    /// Waiting for a pooled connection fails after this long
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            ssl_mode: PgSslMode::Prefer,
            max_connections: 10,
            idle_timeout: Duration::from_secs(30),
            acquire_timeout: Duration::from_secs(2),
        }
    }
}

impl DatabaseConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, PurchaseError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let ssl_mode = match env::var("DB_SSL_MODE") {
            Ok(raw) => PgSslMode::from_str(&raw).map_err(|_| {
                PurchaseError::Configuration(format!("DB_SSL_MODE has unknown value: {}", raw))
            })?,
            Err(_) => defaults.ssl_mode,
        };

        Ok(Self {
            url: env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()),
            host: env::var("DB_HOST").unwrap_or(defaults.host),
            port: parse_var("DB_PORT", defaults.port)?,
            database: env::var("DB_NAME").unwrap_or(defaults.database),
            user: env::var("DB_USER").unwrap_or(defaults.user),
            password: env::var("DB_PASSWORD").unwrap_or(defaults.password),
            ssl_mode,
            max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            idle_timeout: Duration::from_secs(parse_var(
                "DB_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout.as_secs(),
            )?),
            acquire_timeout: Duration::from_secs(parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )?),
        })
    }

    /// Builder: use a full connection string
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Connection options for the driver
    pub fn connect_options(&self) -> Result<PgConnectOptions, PurchaseError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(|e| {
                PurchaseError::Configuration(format!("DATABASE_URL is invalid: {}", e))
            });
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(self.ssl_mode))
    }

    /// Pool limits
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .idle_timeout(self.idle_timeout)
            .acquire_timeout(self.acquire_timeout)
    }

    /// Connection target without credentials, for logs
    pub fn describe(&self) -> String {
        match &self.url {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, PurchaseError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| PurchaseError::Configuration(format!("{} has invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
