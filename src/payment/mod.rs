//! Payment service core
//!
//! # Architecture
//!
//! ```text
//! POST /payments/orders  ──► PaymentBroker ──► PaymentGateway (remote order, timeout)
//!                                        └──► PaymentStore::insert_pending
//! POST /payments/verify  ──► PaymentReconciler::verify_payment ─┐
//! POST /payments/webhook ──► PaymentReconciler::handle_webhook ─┴► PaymentStore::transition (CAS)
//! ```
//!
//! The payment store is separate from the booking store; `booking_id` and
//! `user_id` are plain numbers here.

pub mod broker;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod models;
pub mod pg;
pub mod reconciler;
pub mod signature;
pub mod state;
pub mod store;
pub mod webhook;

pub use broker::{BrokerConfig, PaymentBroker};
pub use error::PaymentError;
pub use gateway::{GatewayError, PaymentGateway, RazorpayGateway, SandboxGateway};
pub use memory::InMemoryPaymentStore;
pub use models::{CreateOrderCommand, OrderDescriptor, Payment, PaymentConfirmation, VerifyCommand};
pub use pg::PgPaymentStore;
pub use reconciler::PaymentReconciler;
pub use signature::{PaymentSignatureVerifier, WebhookSignatureVerifier};
pub use state::PaymentStatus;
pub use store::PaymentStore;
pub use webhook::WebhookOutcome;
