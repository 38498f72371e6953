//! Shared error taxonomy
//!
//! Domain errors (`BookingError`, `PaymentError`) each classify themselves
//! into an [`ErrorKind`]; the HTTP layer maps kinds to status codes.

use thiserror::Error;

/// Error classes visible at the service boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input
    Validation,
    /// Unknown user, room, booking or payment
    NotFound,
    /// Room unavailable, or a payment already finalized differently
    Conflict,
    /// Tampered or forged payment confirmation
    SignatureMismatch,
    /// Upstream payment provider failure
    Gateway,
    /// Anything unexpected
    Internal,
}

impl ErrorKind {
    /// Stable string code for API responses
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::SignatureMismatch => "SIGNATURE_MISMATCH",
            ErrorKind::Gateway => "GATEWAY_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::SignatureMismatch => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Gateway => 502,
            ErrorKind::Internal => 500,
        }
    }
}

/// Failures raised by store adapters (PostgreSQL or in-memory)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
}
