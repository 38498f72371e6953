//! Payment error types

use thiserror::Error;

use super::gateway::GatewayError;
use super::state::PaymentStatus;
use crate::core_types::{BookingId, PaymentId};
use crate::error::{ErrorKind, StoreError};
use crate::money::MoneyError;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error("Payment not found: {0}")]
    NotFound(String),

    #[error("Payment signature verification failed for order {order_id}")]
    SignatureMismatch { order_id: String },

    #[error("Payment for order {order_id} is already {status}")]
    AlreadyFinalized {
        order_id: String,
        status: PaymentStatus,
    },

    #[error("Booking {booking_id} is already paid by payment {payment_id}")]
    BookingAlreadyPaid {
        booking_id: BookingId,
        payment_id: PaymentId,
    },

    #[error("Idempotency key {key} was used for a different order request")]
    IdempotencyMismatch { key: String },

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::InvalidInput(_) | PaymentError::Money(_) => ErrorKind::Validation,
            PaymentError::NotFound(_) => ErrorKind::NotFound,
            PaymentError::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
            PaymentError::AlreadyFinalized { .. }
            | PaymentError::BookingAlreadyPaid { .. }
            | PaymentError::IdempotencyMismatch { .. } => ErrorKind::Conflict,
            PaymentError::Gateway(_) => ErrorKind::Gateway,
            PaymentError::Store(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }
}
