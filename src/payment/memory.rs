//! In-memory payment store
//!
//! One mutex guards the whole table, which makes every CAS trivially atomic.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::models::{NewPayment, Payment};
use super::state::PaymentStatus;
use super::store::{
    Inserted, PaymentStore, Transition, clamp_error_message, completed_sibling,
};
use crate::core_types::{BookingId, PaymentId, UserId};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct PaymentTable {
    rows: BTreeMap<PaymentId, Payment>,
    last_id: PaymentId,
}

impl PaymentTable {
    fn find<F>(&self, pred: F) -> Option<Payment>
    where
        F: Fn(&Payment) -> bool,
    {
        self.rows.values().find(|p| pred(p)).cloned()
    }

    fn filter<F>(&self, pred: F) -> Vec<Payment>
    where
        F: Fn(&Payment) -> bool,
    {
        self.rows.values().filter(|p| pred(p)).cloned().collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentStore {
    inner: Arc<Mutex<PaymentTable>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payments
    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_pending(&self, new: NewPayment) -> Result<Inserted, StoreError> {
        let mut table = self.inner.lock().await;

        #[allow(clippy::collapsible_if)]
        if let Some(key) = new.idempotency_key.as_deref() {
            if let Some(existing) = table.find(|p| p.idempotency_key.as_deref() == Some(key)) {
                return Ok(Inserted::Existing(existing));
            }
        }
        if table
            .rows
            .values()
            .any(|p| p.gateway_order_id == new.gateway_order_id)
        {
            return Err(StoreError::Corrupt(format!(
                "duplicate gateway order id {}",
                new.gateway_order_id
            )));
        }

        table.last_id += 1;
        let payment = Payment {
            payment_id: table.last_id,
            booking_id: new.booking_id,
            user_id: new.user_id,
            amount: new.amount,
            currency: new.currency,
            gateway_order_id: new.gateway_order_id,
            gateway_payment_id: None,
            signature: None,
            status: PaymentStatus::Pending,
            receipt: new.receipt,
            idempotency_key: new.idempotency_key,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        table.rows.insert(payment.payment_id, payment.clone());
        Ok(Inserted::Created(payment))
    }

    async fn find_by_id(&self, payment_id: PaymentId) -> Result<Option<Payment>, StoreError> {
        Ok(self.inner.lock().await.rows.get(&payment_id).cloned())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .find(|p| p.gateway_order_id == order_id))
    }

    async fn find_by_gateway_payment_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<Payment>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .find(|p| p.gateway_payment_id.as_deref() == Some(gateway_payment_id)))
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .find(|p| p.idempotency_key.as_deref() == Some(key)))
    }

    async fn find_by_booking(&self, booking_id: BookingId) -> Result<Vec<Payment>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .filter(|p| p.booking_id == booking_id))
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Payment>, StoreError> {
        Ok(self.inner.lock().await.filter(|p| p.user_id == user_id))
    }

    async fn transition(
        &self,
        payment_id: PaymentId,
        from: &[PaymentStatus],
        transition: Transition,
    ) -> Result<Option<Payment>, StoreError> {
        let mut table = self.inner.lock().await;
        let Some(booking_id) = table.rows.get(&payment_id).map(|p| p.booking_id) else {
            return Ok(None);
        };
        if transition.target() == PaymentStatus::Completed {
            let siblings = table.filter(|p| p.booking_id == booking_id);
            if completed_sibling(&siblings, payment_id).is_some() {
                return Ok(None);
            }
        }
        let Some(payment) = table.rows.get_mut(&payment_id) else {
            return Ok(None);
        };
        if !from.contains(&payment.status) {
            return Ok(None);
        }

        match transition {
            Transition::Complete {
                gateway_payment_id,
                signature,
            } => {
                payment.status = PaymentStatus::Completed;
                payment.gateway_payment_id = Some(gateway_payment_id);
                if signature.is_some() {
                    payment.signature = signature;
                }
                payment.error_message = None;
                payment.completed_at = Some(Utc::now());
            }
            Transition::Fail {
                gateway_payment_id,
                error,
            } => {
                payment.status = PaymentStatus::Failed;
                if gateway_payment_id.is_some() {
                    payment.gateway_payment_id = gateway_payment_id;
                }
                payment.error_message = Some(clamp_error_message(&error));
            }
        }
        Ok(Some(payment.clone()))
    }

    async fn record_signature(
        &self,
        payment_id: PaymentId,
        signature: &str,
    ) -> Result<Option<Payment>, StoreError> {
        let mut table = self.inner.lock().await;
        match table.rows.get_mut(&payment_id) {
            Some(p) if p.status == PaymentStatus::Completed && p.signature.is_none() => {
                p.signature = Some(signature.to_string());
                Ok(Some(p.clone()))
            }
            _ => Ok(None),
        }
    }
}
