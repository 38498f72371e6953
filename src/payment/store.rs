//! Payment persistence seam
//!
//! Every status change goes through [`PaymentStore::transition`], a
//! compare-and-set on the current status. Racing writers (client verification
//! and webhook deliveries) therefore apply each terminal event at most once.

use async_trait::async_trait;

use super::models::{NewPayment, Payment};
use super::state::PaymentStatus;
use crate::core_types::{BookingId, PaymentId, UserId};
use crate::error::StoreError;

/// Longest error message persisted
pub const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Status change applied by [`PaymentStore::transition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// `→ COMPLETED`, stamps `completed_at` and clears `error_message`.
    /// A `None` signature keeps the stored one.
    Complete {
        gateway_payment_id: String,
        signature: Option<String>,
    },
    /// `→ FAILED` with a reason. A `None` payment id keeps the stored one.
    Fail {
        gateway_payment_id: Option<String>,
        error: String,
    },
}

impl Transition {
    pub fn target(&self) -> PaymentStatus {
        match self {
            Transition::Complete { .. } => PaymentStatus::Completed,
            Transition::Fail { .. } => PaymentStatus::Failed,
        }
    }
}

/// Result of inserting a new `PENDING` payment
#[derive(Debug, Clone, PartialEq)]
pub enum Inserted {
    Created(Payment),
    /// A row with the same idempotency key already existed
    Existing(Payment),
}

impl Inserted {
    pub fn into_payment(self) -> Payment {
        match self {
            Inserted::Created(p) | Inserted::Existing(p) => p,
        }
    }
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Insert a `PENDING` payment.
    ///
    /// If `idempotency_key` is set and already taken, the existing row is
    /// returned untouched.
    async fn insert_pending(&self, new: NewPayment) -> Result<Inserted, StoreError>;

    async fn find_by_id(&self, payment_id: PaymentId) -> Result<Option<Payment>, StoreError>;

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>, StoreError>;

    async fn find_by_gateway_payment_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<Payment>, StoreError>;

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, StoreError>;

    async fn find_by_booking(&self, booking_id: BookingId) -> Result<Vec<Payment>, StoreError>;

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Payment>, StoreError>;

    /// Atomic CAS: apply `transition` only if the current status is in `from`.
    ///
    /// A `Complete` is also refused while another payment of the same booking
    /// is `COMPLETED`; a booking is paid at most once.
    ///
    /// Returns the updated row, or `None` if the status did not match (another
    /// writer got there first), the booking is already paid, or the payment
    /// does not exist.
    async fn transition(
        &self,
        payment_id: PaymentId,
        from: &[PaymentStatus],
        transition: Transition,
    ) -> Result<Option<Payment>, StoreError>;

    /// Fill in the client signature of a `COMPLETED` payment that has none.
    ///
    /// Returns the updated row, or `None` if nothing was written.
    async fn record_signature(
        &self,
        payment_id: PaymentId,
        signature: &str,
    ) -> Result<Option<Payment>, StoreError>;
}

/// The `COMPLETED` payment of a booking other than `payment_id`, if any
pub fn completed_sibling(payments: &[Payment], payment_id: PaymentId) -> Option<&Payment> {
    payments
        .iter()
        .find(|p| p.status == PaymentStatus::Completed && p.payment_id != payment_id)
}

/// Cut an error message to the persisted column width on a char boundary
pub fn clamp_error_message(msg: &str) -> String {
    if msg.len() <= MAX_ERROR_MESSAGE_LEN {
        return msg.to_string();
    }
    let mut end = MAX_ERROR_MESSAGE_LEN;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    msg[..end].to_string()
}
