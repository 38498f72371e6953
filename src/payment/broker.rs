//! Payment Order Broker
//!
//! Remote-first ordering: the gateway order is created before anything is
//! written locally, so a timed-out or rejected gateway call leaves no
//! `PENDING` row behind.
//!
//! ```text
//! validate ─► idempotency key hit? ─yes─► same request? ─yes─► return existing
//!                    │no                                │no
//!                    │                                  └──► IdempotencyMismatch
//!                    │
//!                    ▼
//!             gateway.create_order (timeout) ──err──► GatewayError, no row
//!                    │ok
//!                    ▼
//!             insert PENDING ─► OrderDescriptor
//! ```

use std::sync::Arc;
use std::time::Duration;

use super::error::PaymentError;
use super::gateway::{GatewayError, GatewayOrderRequest, PaymentGateway};
use super::models::{CreateOrderCommand, NewPayment, OrderDescriptor, Payment};
use super::store::{Inserted, PaymentStore};
use crate::core_types::{BookingId, PaymentId, UserId};
use crate::money;

/// Receipt used when the caller supplies none
pub fn default_receipt(booking_id: BookingId) -> String {
    format!("booking_{}", booking_id)
}

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub default_currency: String,
    pub minor_unit_factor: u32,
    /// Upper bound on the whole gateway call
    pub gateway_timeout: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            default_currency: "INR".to_string(),
            minor_unit_factor: money::DEFAULT_MINOR_UNIT_FACTOR,
            gateway_timeout: Duration::from_secs(10),
        }
    }
}

pub struct PaymentBroker {
    store: Arc<dyn PaymentStore>,
    gateway: Arc<dyn PaymentGateway>,
    config: BrokerConfig,
}

impl PaymentBroker {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        gateway: Arc<dyn PaymentGateway>,
        config: BrokerConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            config,
        }
    }

    /// Create a gateway order for a booking and persist a `PENDING` payment.
    ///
    /// Without an idempotency key every call creates a new gateway order and
    /// a new payment row.
    ///
    /// # Errors
    /// - `Money` / `InvalidInput` for a non-positive or over-precise amount,
    ///   or a malformed currency
    /// - `IdempotencyMismatch` if the key belongs to an order for another
    ///   booking, user, amount or currency
    /// - `Gateway` if the remote call fails or times out
    pub async fn create_order(
        &self,
        cmd: CreateOrderCommand,
    ) -> Result<OrderDescriptor, PaymentError> {
        let amount_minor = money::to_minor_units(cmd.amount, self.config.minor_unit_factor)?;
        let currency = money::normalize_currency(
            cmd.currency
                .as_deref()
                .unwrap_or(&self.config.default_currency),
        )?;
        let receipt = match cmd.receipt.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => default_receipt(cmd.booking_id),
        };
        let idempotency_key = match cmd.idempotency_key.as_deref().map(str::trim) {
            Some(k) if !k.is_empty() => Some(k.to_string()),
            _ => None,
        };

        #[allow(clippy::collapsible_if)]
        if let Some(key) = idempotency_key.as_deref() {
            if let Some(existing) = self.store.find_by_idempotency_key(key).await? {
                ensure_same_request(key, &existing, &cmd, &currency)?;
                tracing::info!(
                    payment_id = existing.payment_id,
                    order_id = %existing.gateway_order_id,
                    idempotency_key = %key,
                    "Order with idempotency key already exists - returning existing record"
                );
                return Ok(self.describe(&existing));
            }
        }

        tracing::info!(
            booking_id = cmd.booking_id,
            user_id = cmd.user_id,
            amount = %cmd.amount,
            currency = %currency,
            gateway = self.gateway.name(),
            "Creating gateway order"
        );

        let request = GatewayOrderRequest {
            amount: amount_minor,
            currency: currency.clone(),
            receipt: receipt.clone(),
        };
        let order = tokio::time::timeout(
            self.config.gateway_timeout,
            self.gateway.create_order(&request),
        )
        .await
        .map_err(|_| GatewayError::Timeout)
        .and_then(|r| r)
        .inspect_err(|e| {
            tracing::error!(booking_id = cmd.booking_id, error = %e, "Gateway order creation failed");
        })?;

        let inserted = self
            .store
            .insert_pending(NewPayment {
                booking_id: cmd.booking_id,
                user_id: cmd.user_id,
                amount: cmd.amount,
                currency: currency.clone(),
                gateway_order_id: order.id.clone(),
                receipt,
                idempotency_key,
            })
            .await?;

        let payment = match inserted {
            Inserted::Created(p) => {
                tracing::info!(
                    payment_id = p.payment_id,
                    order_id = %p.gateway_order_id,
                    "Payment order created"
                );
                p
            }
            Inserted::Existing(p) => {
                // Lost a race on the same idempotency key; our remote order is unused
                tracing::warn!(
                    payment_id = p.payment_id,
                    unused_order_id = %order.id,
                    "Concurrent order creation with the same idempotency key"
                );
                if let Some(key) = p.idempotency_key.as_deref() {
                    ensure_same_request(key, &p, &cmd, &currency)?;
                }
                p
            }
        };

        Ok(self.describe(&payment))
    }

    fn describe(&self, payment: &Payment) -> OrderDescriptor {
        OrderDescriptor {
            payment_id: payment.payment_id,
            gateway_order_id: payment.gateway_order_id.clone(),
            amount: payment.amount,
            currency: payment.currency.clone(),
            key_id: self.gateway.key_id().to_string(),
        }
    }

    pub async fn get_payment(&self, payment_id: PaymentId) -> Result<Payment, PaymentError> {
        self.store
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(payment_id.to_string()))
    }

    pub async fn payments_of_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<Vec<Payment>, PaymentError> {
        Ok(self.store.find_by_booking(booking_id).await?)
    }

    pub async fn payments_of_user(&self, user_id: UserId) -> Result<Vec<Payment>, PaymentError> {
        Ok(self.store.find_by_user(user_id).await?)
    }
}

/// A reused idempotency key must describe the order it was first used for
fn ensure_same_request(
    key: &str,
    existing: &Payment,
    cmd: &CreateOrderCommand,
    currency: &str,
) -> Result<(), PaymentError> {
    if existing.booking_id == cmd.booking_id
        && existing.user_id == cmd.user_id
        && existing.amount == cmd.amount
        && existing.currency == currency
    {
        return Ok(());
    }
    tracing::warn!(
        idempotency_key = %key,
        payment_id = existing.payment_id,
        stored_booking_id = existing.booking_id,
        booking_id = cmd.booking_id,
        stored_amount = %existing.amount,
        amount = %cmd.amount,
        "Idempotency key reused for a different order request"
    );
    Err(PaymentError::IdempotencyMismatch {
        key: key.to_string(),
    })
}
