//! Payment status definitions
//!
//! Statuses are stored as TEXT in PostgreSQL using [`PaymentStatus::as_str`].

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Payment lifecycle
///
/// ```text
/// PENDING ──► COMPLETED ──► (REFUNDED | CANCELLED)
///    │            ▲
///    ▼            │ retry on the same order
///  FAILED ────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Initial: gateway order created, awaiting confirmation
    Pending,
    Completed,
    Failed,
    /// Set only by an explicit refund flow
    Refunded,
    /// Set only by an explicit cancellation flow
    Cancelled,
}

impl PaymentStatus {
    /// Statuses a valid signature or a capture event may complete from.
    ///
    /// `FAILED` is included: a later valid confirmation for the same order
    /// still completes it.
    #[inline]
    pub fn accepts_completion(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PaymentStatus::Pending),
            "COMPLETED" => Some(PaymentStatus::Completed),
            "FAILED" => Some(PaymentStatus::Failed),
            "REFUNDED" => Some(PaymentStatus::Refunded),
            "CANCELLED" => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
