//! Shared fixtures for the integration tests
//!
//! In-memory stores, a scripted gateway double, and helpers that drive the
//! routers with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use stayline::api::{self, BookingState, PaymentState};
use stayline::booking::{InMemoryInventory, Room};
use stayline::payment::gateway::{GatewayOrder, GatewayOrderRequest};
use stayline::payment::{
    BrokerConfig, GatewayError, InMemoryPaymentStore, PaymentBroker, PaymentGateway,
    PaymentReconciler, PaymentSignatureVerifier, WebhookSignatureVerifier,
};

pub const KEY_ID: &str = "rzp_test_key";
pub const KEY_SECRET: &str = "test-key-secret";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub const USER: i64 = 7;
pub const HOTEL: i64 = 1;
pub const ROOM: i64 = 101;

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

// ============================================================================
// Booking side
// ============================================================================

pub fn room(room_id: i64, hotel_id: i64, price: Decimal) -> Room {
    Room {
        room_id,
        hotel_id,
        room_number: room_id.to_string(),
        room_type: "Deluxe".to_string(),
        price,
        available: true,
    }
}

/// Hotel 1 with rooms 101 (1500.00) and 102 (950.00); users 7 and 8.
pub async fn seeded_inventory() -> InMemoryInventory {
    let inv = InMemoryInventory::new();
    inv.add_user(USER).await;
    inv.add_user(8).await;
    inv.add_room(room(ROOM, HOTEL, dec!(1500.00))).await;
    inv.add_room(room(102, HOTEL, dec!(950.00))).await;
    inv
}

pub fn booking_state(inv: &InMemoryInventory) -> Arc<BookingState> {
    Arc::new(BookingState::new(
        Arc::new(inv.clone()),
        Arc::new(inv.clone()),
    ))
}

// ============================================================================
// Payment side
// ============================================================================

/// What the scripted gateway does on `create_order`
#[derive(Debug, Clone)]
pub enum Script {
    Succeed,
    Reject(u16),
    /// Never answers
    Hang,
}

/// Gateway double that records every request
#[derive(Debug)]
pub struct ScriptedGateway {
    script: Mutex<Script>,
    seq: AtomicU64,
    pub requests: Mutex<Vec<GatewayOrderRequest>>,
}

impl ScriptedGateway {
    pub fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            seq: AtomicU64::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GatewayOrderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn key_id(&self) -> &str {
        KEY_ID
    }

    async fn create_order(&self, req: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        self.requests.lock().unwrap().push(req.clone());
        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Succeed => {
                let n = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(GatewayOrder {
                    id: format!("order_test_{}", n),
                    amount: Some(req.amount),
                    currency: Some(req.currency.clone()),
                    status: Some("created".to_string()),
                })
            }
            Script::Reject(status) => Err(GatewayError::Rejected {
                status,
                body: r#"{"error":{"code":"BAD_REQUEST_ERROR"}}"#.to_string(),
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GatewayError::Timeout)
            }
        }
    }
}

pub struct PaymentFixture {
    pub store: Arc<InMemoryPaymentStore>,
    pub gateway: Arc<ScriptedGateway>,
    pub state: Arc<PaymentState>,
}

impl PaymentFixture {
    pub fn new(script: Script) -> Self {
        let store = Arc::new(InMemoryPaymentStore::new());
        let gateway = Arc::new(ScriptedGateway::new(script));
        let broker = PaymentBroker::new(
            store.clone(),
            gateway.clone(),
            BrokerConfig {
                gateway_timeout: Duration::from_millis(100),
                ..BrokerConfig::default()
            },
        );
        let reconciler = PaymentReconciler::new(
            store.clone(),
            PaymentSignatureVerifier::new(KEY_SECRET).unwrap(),
            WebhookSignatureVerifier::new(WEBHOOK_SECRET).unwrap(),
        );
        let state = Arc::new(PaymentState::new(broker, reconciler, store.clone()));
        Self {
            store,
            gateway,
            state,
        }
    }

    pub fn router(&self) -> Router {
        api::payment_router(self.state.clone())
    }
}

/// Signature the checkout widget would hand back for a genuine payment
pub fn payment_signature(order_id: &str, gateway_payment_id: &str) -> String {
    PaymentSignatureVerifier::new(KEY_SECRET)
        .unwrap()
        .expected(order_id, gateway_payment_id)
}

pub fn webhook_signature(body: &str) -> String {
    WebhookSignatureVerifier::new(WEBHOOK_SECRET)
        .unwrap()
        .sign(body.as_bytes())
}

pub fn captured_event(gateway_payment_id: &str, order_id: &str) -> String {
    serde_json::json!({
        "entity": "event",
        "event": "payment.captured",
        "contains": ["payment"],
        "payload": {"payment": {"entity": {
            "id": gateway_payment_id,
            "entity": "payment",
            "amount": 150000,
            "currency": "INR",
            "status": "captured",
            "order_id": order_id
        }}}
    })
    .to_string()
}

pub fn failed_event(gateway_payment_id: &str, order_id: &str, description: &str) -> String {
    serde_json::json!({
        "entity": "event",
        "event": "payment.failed",
        "payload": {"payment": {"entity": {
            "id": gateway_payment_id,
            "entity": "payment",
            "status": "failed",
            "order_id": order_id,
            "error_code": "BAD_REQUEST_ERROR",
            "error_description": description
        }}}
    })
    .to_string()
}

// ============================================================================
// HTTP helpers
// ============================================================================

pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn post_webhook(app: Router, body: &str, signature: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/payments/webhook")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("X-Razorpay-Signature", sig);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}
