//! Gateway webhook payloads and processing outcomes
//!
//! Only the fields the reconciler needs are decoded; everything else in the
//! gateway's event envelope is ignored.

use serde::{Deserialize, Serialize};

use super::state::PaymentStatus;
use crate::core_types::PaymentId;

/// Header carrying the hex HMAC of the raw webhook body
pub const SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

pub const EVENT_PAYMENT_CAPTURED: &str = "payment.captured";
pub const EVENT_PAYMENT_FAILED: &str = "payment.failed";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub payment: Option<EntityWrapper>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityWrapper {
    pub entity: PaymentEntity,
}

/// Gateway-side payment object
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEntity {
    /// Gateway payment id
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl WebhookEnvelope {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn payment_entity(&self) -> Option<&PaymentEntity> {
        self.payload.payment.as_ref().map(|w| &w.entity)
    }
}

/// Events the reconciler acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEvent {
    Captured,
    Failed,
}

impl WebhookEvent {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            EVENT_PAYMENT_CAPTURED => Some(WebhookEvent::Captured),
            EVENT_PAYMENT_FAILED => Some(WebhookEvent::Failed),
            _ => None,
        }
    }
}

/// What a webhook delivery did. Always acknowledged with HTTP 200.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum WebhookOutcome {
    /// Status changed
    #[serde(rename_all = "camelCase")]
    Applied {
        event: String,
        payment_id: PaymentId,
        status: PaymentStatus,
    },
    /// Event already reflected; nothing written
    #[serde(rename_all = "camelCase")]
    Duplicate {
        event: String,
        payment_id: PaymentId,
        status: PaymentStatus,
    },
    /// Unknown event, or a stale event for a payment in another state
    Ignored { event: String, reason: String },
    /// No payment matches the gateway ids
    #[serde(rename_all = "camelCase")]
    Unmatched {
        event: String,
        gateway_payment_id: String,
    },
    /// Event contradicts recorded state, e.g. a second capture for an order
    /// or booking that is already paid; nothing written
    #[serde(rename_all = "camelCase")]
    Conflict {
        event: String,
        payment_id: PaymentId,
        gateway_payment_id: String,
        reason: String,
    },
    /// Bad signature or malformed payload; nothing trusted
    Rejected { reason: String },
    /// Internal failure while applying; logged, gateway may redeliver
    Error { event: String, reason: String },
}

impl WebhookOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            WebhookOutcome::Applied { .. } => "applied",
            WebhookOutcome::Duplicate { .. } => "duplicate",
            WebhookOutcome::Ignored { .. } => "ignored",
            WebhookOutcome::Unmatched { .. } => "unmatched",
            WebhookOutcome::Conflict { .. } => "conflict",
            WebhookOutcome::Rejected { .. } => "rejected",
            WebhookOutcome::Error { .. } => "error",
        }
    }

    /// True only if a payment row changed
    pub fn mutated(&self) -> bool {
        matches!(self, WebhookOutcome::Applied { .. })
    }
}
