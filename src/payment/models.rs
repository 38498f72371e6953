//! Payment records and broker/reconciler inputs and outputs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::state::PaymentStatus;
use crate::core_types::{BookingId, PaymentId, UserId};

/// Persisted payment row
///
/// `booking_id` and `user_id` point into the booking service by number only.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_id: PaymentId,
    pub booking_id: BookingId,
    pub user_id: UserId,
    #[schema(value_type = String, example = "1500.00")]
    pub amount: Decimal,
    #[schema(example = "INR")]
    pub currency: String,
    /// Gateway order id, unique, assigned at creation
    #[schema(example = "order_Nx81d9TQwYdWq1")]
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    #[serde(skip_serializing)]
    pub signature: Option<String>,
    pub status: PaymentStatus,
    pub receipt: String,
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
    pub error_message: Option<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<String>)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Payment about to be inserted in `PENDING`
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub currency: String,
    pub gateway_order_id: String,
    pub receipt: String,
    pub idempotency_key: Option<String>,
}

/// Input of `PaymentBroker::create_order`
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub amount: Decimal,
    /// Falls back to the configured default currency
    pub currency: Option<String>,
    /// Defaults to `booking_{booking_id}`
    pub receipt: Option<String>,
    pub idempotency_key: Option<String>,
}

/// What a client needs to complete checkout with the gateway
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDescriptor {
    pub payment_id: PaymentId,
    pub gateway_order_id: String,
    #[schema(value_type = String, example = "1500.00")]
    pub amount: Decimal,
    pub currency: String,
    /// Public key identifier; the secret never leaves the service
    pub key_id: String,
}

/// Input of `PaymentReconciler::verify_payment`
#[derive(Debug, Clone)]
pub struct VerifyCommand {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub payment_id: PaymentId,
    pub booking_id: BookingId,
    #[schema(value_type = String, example = "1500.00")]
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub gateway_payment_id: Option<String>,
    #[schema(value_type = Option<String>)]
    pub completed_at: Option<DateTime<Utc>>,
    pub message: String,
}

impl PaymentConfirmation {
    pub fn from_payment(payment: &Payment) -> Self {
        Self {
            payment_id: payment.payment_id,
            booking_id: payment.booking_id,
            amount: payment.amount,
            currency: payment.currency.clone(),
            status: payment.status,
            gateway_payment_id: payment.gateway_payment_id.clone(),
            completed_at: payment.completed_at,
            message: "Payment completed successfully".to_string(),
        }
    }
}
