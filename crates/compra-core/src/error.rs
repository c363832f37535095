//! # Purchase Error Types
//!
//! Typed error handling for the purchase backend.
//! Workflow operations return `Result<T, PurchaseError>`; store backends
//! return `Result<T, StoreError>`.

use thiserror::Error;

/// Malformed or missing purchase input. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `Cedula` or `Precio_total` absent
    #[error("Cedula and Precio_total are required")]
    MissingFields,

    /// `Cedula` is not a numeric string
    #[error("Cedula must contain only numbers")]
    InvalidCedula,

    /// `Precio_total` is not a positive number
    #[error("Precio_total must be a positive number")]
    InvalidPrice,

    /// `Bank` or `Cuenta` is not a non-negative integer
    #[error("Bank and Cuenta must be non-negative integers")]
    InvalidBankDetails,

    /// Body could not be decoded at all
    #[error("{0}")]
    MalformedBody(String),
}

impl ValidationError {
    /// Short error title used in the HTTP envelope `error` field
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingFields => "Missing required fields",
            ValidationError::InvalidCedula => "Invalid Cedula format",
            ValidationError::InvalidPrice => "Invalid price",
            ValidationError::InvalidBankDetails => "Invalid bank details",
            ValidationError::MalformedBody(_) => "Invalid request body",
        }
    }
}

/// Errors raised by transaction store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with this id already exists
    #[error("Transaction already exists: {transaction_id}")]
    Duplicate { transaction_id: String },

    /// Update targeted a row that does not exist
    #[error("Transaction not found: {transaction_id}")]
    NotFound { transaction_id: String },

    /// Connectivity failure, pool exhaustion or acquisition timeout
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded
    #[error("Corrupt transaction row: {0}")]
    Corrupt(String),

    /// Any other database failure
    #[error("Store query failed: {0}")]
    Query(String),
}

/// Core error type for purchase operations
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// Invalid input
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown transaction id
    #[error("No transaction found with ID: {transaction_id}")]
    NotFound { transaction_id: String },

    /// Transaction store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PurchaseError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PurchaseError::Validation(_) => 400,
            PurchaseError::NotFound { .. } => 404,
            PurchaseError::Store(_) => 500,
            PurchaseError::Configuration(_) => 500,
            PurchaseError::Internal(_) => 500,
        }
    }

    /// Short error title used in the HTTP envelope `error` field
    pub fn title(&self) -> &'static str {
        match self {
            PurchaseError::Validation(v) => v.title(),
            PurchaseError::NotFound { .. } => "Transaction not found",
            _ => "Internal server error",
        }
    }
}

/// Result type alias for purchase operations
pub type PurchaseResult<T> = Result<T, PurchaseError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
