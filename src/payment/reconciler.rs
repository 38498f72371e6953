//! Payment Verification & Webhook Reconciler
//!
//! Two racing writers drive the same payment row:
//! - the client confirmation path ([`PaymentReconciler::verify_payment`])
//! - gateway webhooks ([`PaymentReconciler::handle_webhook`]), at-least-once
//!   and unordered
//!
//! Both decide from the row they read, then write through a status CAS. A
//! lost CAS means another writer moved the row first; the decision is redone
//! against the fresh row, so a terminal event is applied at most once and
//! duplicates never rewrite `completed_at`.

use std::sync::Arc;

use super::error::PaymentError;
use super::models::{Payment, PaymentConfirmation, VerifyCommand};
use super::signature::{PaymentSignatureVerifier, WebhookSignatureVerifier};
use super::state::PaymentStatus;
use super::store::{PaymentStore, Transition, completed_sibling};
use super::webhook::{PaymentEntity, WebhookEnvelope, WebhookEvent, WebhookOutcome};
use crate::error::StoreError;

/// Attempts before a CAS loop gives up
const MAX_CAS_ATTEMPTS: usize = 3;

const SIGNATURE_FAILED_MESSAGE: &str = "Signature verification failed";
const GATEWAY_FAILED_MESSAGE: &str = "Payment failed at gateway";

pub struct PaymentReconciler {
    store: Arc<dyn PaymentStore>,
    payment_signatures: PaymentSignatureVerifier,
    webhook_signatures: WebhookSignatureVerifier,
}

impl PaymentReconciler {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        payment_signatures: PaymentSignatureVerifier,
        webhook_signatures: WebhookSignatureVerifier,
    ) -> Self {
        Self {
            store,
            payment_signatures,
            webhook_signatures,
        }
    }

    /// Verify a client-submitted confirmation for a gateway order.
    ///
    /// | current status     | valid signature                | invalid signature         |
    /// |--------------------|--------------------------------|---------------------------|
    /// | PENDING / FAILED   | → COMPLETED, confirmation      | → FAILED, SignatureMismatch |
    /// | COMPLETED          | same payment id: stored result | SignatureMismatch, no write |
    /// | REFUNDED/CANCELLED | AlreadyFinalized               | SignatureMismatch, no write |
    ///
    /// # Errors
    /// - `InvalidInput` for empty fields
    /// - `NotFound` for an unknown order id
    /// - `SignatureMismatch` for a forged or tampered signature
    /// - `AlreadyFinalized` if the order completed with another payment id
    /// - `BookingAlreadyPaid` if another order of the booking is `COMPLETED`
    pub async fn verify_payment(
        &self,
        cmd: VerifyCommand,
    ) -> Result<PaymentConfirmation, PaymentError> {
        for (field, value) in [
            ("orderId", &cmd.gateway_order_id),
            ("gatewayPaymentId", &cmd.gateway_payment_id),
            ("signature", &cmd.signature),
        ] {
            if value.trim().is_empty() {
                return Err(PaymentError::InvalidInput(format!("{} is required", field)));
            }
        }

        let valid = self.payment_signatures.verify(
            &cmd.gateway_order_id,
            &cmd.gateway_payment_id,
            &cmd.signature,
        );

        for _ in 0..MAX_CAS_ATTEMPTS {
            let payment = self
                .store
                .find_by_order_id(&cmd.gateway_order_id)
                .await?
                .ok_or_else(|| PaymentError::NotFound(cmd.gateway_order_id.clone()))?;

            if !valid {
                return Err(self.reject_signature(&payment).await?);
            }

            match payment.status {
                PaymentStatus::Completed => {
                    if payment.gateway_payment_id.as_deref()
                        != Some(cmd.gateway_payment_id.as_str())
                    {
                        return Err(Self::finalized(&payment));
                    }
                    tracing::info!(
                        payment_id = payment.payment_id,
                        order_id = %payment.gateway_order_id,
                        "Payment already verified - returning stored result"
                    );
                    // Captured by webhook before the client confirmed
                    let payment = if payment.signature.is_none() {
                        self.store
                            .record_signature(payment.payment_id, &cmd.signature)
                            .await?
                            .unwrap_or(payment)
                    } else {
                        payment
                    };
                    return Ok(PaymentConfirmation::from_payment(&payment));
                }
                PaymentStatus::Refunded | PaymentStatus::Cancelled => {
                    return Err(Self::finalized(&payment));
                }
                PaymentStatus::Pending | PaymentStatus::Failed => {
                    if let Some(paid) = self.paid_sibling(&payment).await? {
                        tracing::warn!(
                            payment_id = payment.payment_id,
                            booking_id = payment.booking_id,
                            paid_payment_id = paid.payment_id,
                            "Verification refused: booking already paid"
                        );
                        return Err(PaymentError::BookingAlreadyPaid {
                            booking_id: payment.booking_id,
                            payment_id: paid.payment_id,
                        });
                    }
                    let transition = Transition::Complete {
                        gateway_payment_id: cmd.gateway_payment_id.clone(),
                        signature: Some(cmd.signature.clone()),
                    };
                    if let Some(done) = self
                        .store
                        .transition(
                            payment.payment_id,
                            &[PaymentStatus::Pending, PaymentStatus::Failed],
                            transition,
                        )
                        .await?
                    {
                        tracing::info!(
                            payment_id = done.payment_id,
                            order_id = %done.gateway_order_id,
                            gateway_payment_id = %cmd.gateway_payment_id,
                            "Payment verified successfully"
                        );
                        return Ok(PaymentConfirmation::from_payment(&done));
                    }
                    tracing::debug!(
                        payment_id = payment.payment_id,
                        "Verification lost status race, re-reading"
                    );
                }
            }
        }

        Err(PaymentError::Store(StoreError::Corrupt(format!(
            "payment for order {} kept changing during verification",
            cmd.gateway_order_id
        ))))
    }

    /// Mark a forgeable payment `FAILED` and build the mismatch error.
    ///
    /// `COMPLETED` and later states are never downgraded by a bad signature.
    async fn reject_signature(&self, payment: &Payment) -> Result<PaymentError, PaymentError> {
        tracing::warn!(
            payment_id = payment.payment_id,
            order_id = %payment.gateway_order_id,
            status = %payment.status,
            "Payment signature verification failed"
        );

        if payment.status.accepts_completion() {
            self.store
                .transition(
                    payment.payment_id,
                    &[PaymentStatus::Pending, PaymentStatus::Failed],
                    Transition::Fail {
                        gateway_payment_id: None,
                        error: SIGNATURE_FAILED_MESSAGE.to_string(),
                    },
                )
                .await?;
        }

        Ok(PaymentError::SignatureMismatch {
            order_id: payment.gateway_order_id.clone(),
        })
    }

    /// Another payment of the same booking that is already `COMPLETED`
    async fn paid_sibling(&self, payment: &Payment) -> Result<Option<Payment>, StoreError> {
        let payments = self.store.find_by_booking(payment.booking_id).await?;
        Ok(completed_sibling(&payments, payment.payment_id).cloned())
    }

    fn finalized(payment: &Payment) -> PaymentError {
        PaymentError::AlreadyFinalized {
            order_id: payment.gateway_order_id.clone(),
            status: payment.status,
        }
    }

    /// Process one webhook delivery.
    ///
    /// Never fails: every path yields an outcome for the acknowledgement.
    /// Nothing is mutated unless the body signature checks out.
    pub async fn handle_webhook(&self, body: &[u8], signature: Option<&str>) -> WebhookOutcome {
        let Some(signature) = signature.filter(|s| !s.trim().is_empty()) else {
            tracing::warn!("Webhook rejected: missing signature header");
            return WebhookOutcome::Rejected {
                reason: "missing signature".to_string(),
            };
        };
        if !self.webhook_signatures.verify(body, signature) {
            tracing::warn!(body_len = body.len(), "Webhook rejected: invalid signature");
            return WebhookOutcome::Rejected {
                reason: "invalid signature".to_string(),
            };
        }

        let envelope = match WebhookEnvelope::parse(body) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, "Webhook rejected: malformed payload");
                return WebhookOutcome::Rejected {
                    reason: format!("malformed payload: {}", e),
                };
            }
        };

        tracing::info!(event = %envelope.event, "Webhook received");

        let Some(kind) = WebhookEvent::from_name(&envelope.event) else {
            tracing::info!(event = %envelope.event, "Unhandled webhook event");
            return WebhookOutcome::Ignored {
                event: envelope.event.clone(),
                reason: "unhandled event".to_string(),
            };
        };
        let Some(entity) = envelope.payment_entity() else {
            tracing::warn!(event = %envelope.event, "Webhook rejected: no payment entity");
            return WebhookOutcome::Rejected {
                reason: "missing payment entity".to_string(),
            };
        };

        match self.apply_event(&envelope.event, kind, entity).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    event = %envelope.event,
                    gateway_payment_id = %entity.id,
                    error = %e,
                    "Webhook processing failed"
                );
                WebhookOutcome::Error {
                    event: envelope.event.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn find_for_entity(&self, entity: &PaymentEntity) -> Result<Option<Payment>, StoreError> {
        if let Some(p) = self.store.find_by_gateway_payment_id(&entity.id).await? {
            return Ok(Some(p));
        }
        match entity.order_id.as_deref() {
            Some(order_id) => self.store.find_by_order_id(order_id).await,
            None => Ok(None),
        }
    }

    async fn apply_event(
        &self,
        event: &str,
        kind: WebhookEvent,
        entity: &PaymentEntity,
    ) -> Result<WebhookOutcome, StoreError> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let Some(payment) = self.find_for_entity(entity).await? else {
                tracing::info!(
                    event,
                    gateway_payment_id = %entity.id,
                    order_id = ?entity.order_id,
                    "Webhook for unknown payment dropped"
                );
                return Ok(WebhookOutcome::Unmatched {
                    event: event.to_string(),
                    gateway_payment_id: entity.id.clone(),
                });
            };

            let (from, transition): (&[PaymentStatus], Transition) = match (kind, payment.status) {
                (WebhookEvent::Captured, PaymentStatus::Completed)
                    if payment.gateway_payment_id.as_deref() != Some(entity.id.as_str()) =>
                {
                    tracing::warn!(
                        event,
                        payment_id = payment.payment_id,
                        order_id = %payment.gateway_order_id,
                        stored_gateway_payment_id = ?payment.gateway_payment_id,
                        gateway_payment_id = %entity.id,
                        "Second capture for a completed order"
                    );
                    return Ok(WebhookOutcome::Conflict {
                        event: event.to_string(),
                        payment_id: payment.payment_id,
                        gateway_payment_id: entity.id.clone(),
                        reason: "order already captured by another payment".to_string(),
                    });
                }
                (WebhookEvent::Captured, PaymentStatus::Completed)
                | (WebhookEvent::Failed, PaymentStatus::Failed) => {
                    tracing::info!(
                        event,
                        payment_id = payment.payment_id,
                        "Duplicate webhook, already applied"
                    );
                    return Ok(WebhookOutcome::Duplicate {
                        event: event.to_string(),
                        payment_id: payment.payment_id,
                        status: payment.status,
                    });
                }
                (WebhookEvent::Captured, PaymentStatus::Pending | PaymentStatus::Failed) => {
                    if let Some(paid) = self.paid_sibling(&payment).await? {
                        tracing::warn!(
                            event,
                            payment_id = payment.payment_id,
                            booking_id = payment.booking_id,
                            paid_payment_id = paid.payment_id,
                            gateway_payment_id = %entity.id,
                            "Capture for a booking that is already paid"
                        );
                        return Ok(WebhookOutcome::Conflict {
                            event: event.to_string(),
                            payment_id: payment.payment_id,
                            gateway_payment_id: entity.id.clone(),
                            reason: format!("booking already paid by payment {}", paid.payment_id),
                        });
                    }
                    (
                        &[PaymentStatus::Pending, PaymentStatus::Failed][..],
                        Transition::Complete {
                            gateway_payment_id: entity.id.clone(),
                            signature: None,
                        },
                    )
                }
                (WebhookEvent::Failed, PaymentStatus::Pending) => (
                    &[PaymentStatus::Pending][..],
                    Transition::Fail {
                        gateway_payment_id: Some(entity.id.clone()),
                        error: entity
                            .error_description
                            .clone()
                            .filter(|d| !d.trim().is_empty())
                            .unwrap_or_else(|| GATEWAY_FAILED_MESSAGE.to_string()),
                    },
                ),
                (_, status) => {
                    tracing::info!(
                        event,
                        payment_id = payment.payment_id,
                        status = %status,
                        "Stale webhook ignored"
                    );
                    return Ok(WebhookOutcome::Ignored {
                        event: event.to_string(),
                        reason: format!("payment is {}", status),
                    });
                }
            };

            if let Some(updated) = self
                .store
                .transition(payment.payment_id, from, transition)
                .await?
            {
                match kind {
                    WebhookEvent::Captured => tracing::info!(
                        payment_id = updated.payment_id,
                        gateway_payment_id = %entity.id,
                        "Payment captured"
                    ),
                    WebhookEvent::Failed => tracing::warn!(
                        payment_id = updated.payment_id,
                        gateway_payment_id = %entity.id,
                        error = ?updated.error_message,
                        "Payment failed"
                    ),
                }
                return Ok(WebhookOutcome::Applied {
                    event: event.to_string(),
                    payment_id: updated.payment_id,
                    status: updated.status,
                });
            }
        }

        Err(StoreError::Corrupt(format!(
            "payment for {} kept changing during webhook",
            entity.id
        )))
    }
}
