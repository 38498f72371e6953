//! Payment service end to end: orders, verification, webhooks

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use stayline::payment::{PaymentStatus, PaymentStore};

async fn create_order(fx: &PaymentFixture, body: serde_json::Value) -> serde_json::Value {
    let (status, resp) = post_json(fx.router(), "/api/v1/payments/orders", body).await;
    assert_eq!(status, StatusCode::OK, "{}", resp);
    resp["data"].clone()
}

fn order_body() -> serde_json::Value {
    json!({"bookingId": 1, "userId": 7, "amount": "1500.00"})
}

#[tokio::test]
async fn test_forged_then_genuine_signature() {
    let fx = PaymentFixture::new(Script::Succeed);

    let order = create_order(&fx, order_body()).await;
    let order_id = order["gatewayOrderId"].as_str().unwrap().to_string();
    assert_eq!(order["amount"], "1500.00");
    assert_eq!(order["currency"], "INR");
    assert_eq!(order["keyId"], KEY_ID);

    let sent = fx.gateway.last_request().unwrap();
    assert_eq!(sent.amount, 150_000);
    assert_eq!(sent.receipt, "booking_1");

    // Forged signature fails the attempt
    let (status, body) = post_json(
        fx.router(),
        "/api/v1/payments/verify",
        json!({"orderId": order_id, "gatewayPaymentId": "pay_A", "signature": "00ff"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1002);

    let payment = fx.store.find_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert_eq!(
        payment.error_message.as_deref(),
        Some("Signature verification failed")
    );

    // The customer retries with a genuine signature on the same order
    let (status, body) = post_json(
        fx.router(),
        "/api/v1/payments/verify",
        json!({
            "razorpayOrderId": order_id,
            "razorpayPaymentId": "pay_A",
            "razorpaySignature": payment_signature(&order_id, "pay_A"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert_eq!(body["data"]["gatewayPaymentId"], "pay_A");
    assert_eq!(body["data"]["message"], "Payment completed successfully");

    let payment = fx.store.find_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert!(payment.completed_at.is_some());
    assert!(payment.error_message.is_none());
}

#[tokio::test]
async fn test_verify_is_idempotent() {
    let fx = PaymentFixture::new(Script::Succeed);
    let order = create_order(&fx, order_body()).await;
    let order_id = order["gatewayOrderId"].as_str().unwrap().to_string();
    let body = json!({
        "orderId": order_id,
        "gatewayPaymentId": "pay_B",
        "signature": payment_signature(&order_id, "pay_B"),
    });

    let (s1, first) = post_json(fx.router(), "/api/v1/payments/verify", body.clone()).await;
    let (s2, second) = post_json(fx.router(), "/api/v1/payments/verify", body).await;
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);
    assert_eq!(first["data"]["completedAt"], second["data"]["completedAt"]);

    // Another payment id cannot re-complete the order
    let (status, body) = post_json(
        fx.router(),
        "/api/v1/payments/verify",
        json!({
            "orderId": order_id,
            "gatewayPaymentId": "pay_C",
            "signature": payment_signature(&order_id, "pay_C"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4009);

    // A bad signature never downgrades a completed payment
    let (status, _) = post_json(
        fx.router(),
        "/api/v1/payments/verify",
        json!({"orderId": order_id, "gatewayPaymentId": "pay_B", "signature": "abcd"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let payment = fx.store.find_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(payment.gateway_payment_id.as_deref(), Some("pay_B"));
}

#[tokio::test]
async fn test_verify_unknown_order() {
    let fx = PaymentFixture::new(Script::Succeed);
    let (status, body) = post_json(
        fx.router(),
        "/api/v1/payments/verify",
        json!({
            "orderId": "order_missing",
            "gatewayPaymentId": "pay_X",
            "signature": payment_signature("order_missing", "pay_X"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4004);
}

#[tokio::test]
async fn test_webhook_capture_and_duplicate() {
    let fx = PaymentFixture::new(Script::Succeed);
    let order = create_order(&fx, order_body()).await;
    let order_id = order["gatewayOrderId"].as_str().unwrap().to_string();
    let payment_id = order["paymentId"].as_i64().unwrap();

    let event = captured_event("pay_W", &order_id);
    let sig = webhook_signature(&event);

    let (status, body) = post_webhook(fx.router(), &event, Some(&sig)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "applied");
    assert_eq!(body["data"]["paymentId"], payment_id);

    let (status, body) = post_webhook(fx.router(), &event, Some(&sig)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "duplicate");

    let (_, body) = get(fx.router(), &format!("/api/v1/payments/{}", payment_id)).await;
    assert_eq!(body["data"]["status"], "COMPLETED");
    assert_eq!(body["data"]["gatewayPaymentId"], "pay_W");
    assert!(body["data"].get("signature").is_none());
}

#[tokio::test]
async fn test_webhook_failed_then_stale() {
    let fx = PaymentFixture::new(Script::Succeed);
    let order = create_order(&fx, order_body()).await;
    let order_id = order["gatewayOrderId"].as_str().unwrap().to_string();

    let failed = failed_event("pay_F", &order_id, "Card declined");
    let (_, body) = post_webhook(fx.router(), &failed, Some(&webhook_signature(&failed))).await;
    assert_eq!(body["data"]["outcome"], "applied");

    let payment = fx.store.find_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert_eq!(payment.error_message.as_deref(), Some("Card declined"));

    // A later capture still completes a failed payment
    let captured = captured_event("pay_F", &order_id);
    let (_, body) =
        post_webhook(fx.router(), &captured, Some(&webhook_signature(&captured))).await;
    assert_eq!(body["data"]["outcome"], "applied");

    // A late failure never leaves COMPLETED
    let (_, body) = post_webhook(fx.router(), &failed, Some(&webhook_signature(&failed))).await;
    assert_eq!(body["data"]["outcome"], "ignored");
    let payment = fx.store.find_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
}

#[tokio::test]
async fn test_webhook_untrusted_or_unknown() {
    let fx = PaymentFixture::new(Script::Succeed);
    let order = create_order(&fx, order_body()).await;
    let order_id = order["gatewayOrderId"].as_str().unwrap().to_string();
    let event = captured_event("pay_Z", &order_id);

    let (status, body) = post_webhook(fx.router(), &event, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "rejected");

    let (status, body) = post_webhook(fx.router(), &event, Some("deadbeef")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "rejected");

    let payment = fx.store.find_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    let stranger = captured_event("pay_unknown", "order_unknown");
    let (status, body) =
        post_webhook(fx.router(), &stranger, Some(&webhook_signature(&stranger))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "unmatched");
    assert_eq!(body["data"]["gatewayPaymentId"], "pay_unknown");

    let other = r#"{"event":"refund.created","payload":{}}"#;
    let (_, body) = post_webhook(fx.router(), other, Some(&webhook_signature(other))).await;
    assert_eq!(body["data"]["outcome"], "ignored");
}

#[tokio::test]
async fn test_gateway_failure_leaves_no_row() {
    let fx = PaymentFixture::new(Script::Hang);

    let (status, body) = post_json(fx.router(), "/api/v1/payments/orders", order_body()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], 5002);
    assert!(fx.store.is_empty().await);

    fx.gateway.set_script(Script::Reject(400));
    let (status, _) = post_json(fx.router(), "/api/v1/payments/orders", order_body()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(fx.store.is_empty().await);
    assert_eq!(fx.gateway.calls(), 2);
}

#[tokio::test]
async fn test_order_validation_skips_gateway() {
    let fx = PaymentFixture::new(Script::Succeed);

    for body in [
        json!({"bookingId": 1, "userId": 7, "amount": "0"}),
        json!({"bookingId": 1, "userId": 7, "amount": "-5.00"}),
        json!({"bookingId": 1, "userId": 7, "amount": "10.001"}),
        json!({"bookingId": 1, "userId": 7, "amount": "10.00", "currency": "R$"}),
        json!({"bookingId": 0, "userId": 7, "amount": "10.00"}),
    ] {
        let (status, resp) = post_json(fx.router(), "/api/v1/payments/orders", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} -> {}", body, resp);
        assert_eq!(resp["code"], 1001);
    }
    assert_eq!(fx.gateway.calls(), 0);
}

#[tokio::test]
async fn test_idempotency_key_reuses_order() {
    let fx = PaymentFixture::new(Script::Succeed);
    let body = json!({"bookingId": 3, "userId": 7, "amount": "99.99", "idempotencyKey": "checkout-3"});

    let first = create_order(&fx, body.clone()).await;
    let second = create_order(&fx, body).await;
    assert_eq!(first["paymentId"], second["paymentId"]);
    assert_eq!(first["gatewayOrderId"], second["gatewayOrderId"]);
    assert_eq!(fx.gateway.calls(), 1);

    // Without a key every call is a new order
    create_order(&fx, order_body()).await;
    create_order(&fx, order_body()).await;
    assert_eq!(fx.gateway.calls(), 3);
    assert_eq!(fx.store.len().await, 3);

    let (_, body) = get(fx.router(), "/api/v1/payments/booking/1").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    let (_, body) = get(fx.router(), "/api/v1/payments/user/7").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_idempotency_key_reused_for_other_booking() {
    let fx = PaymentFixture::new(Script::Succeed);
    let first = json!({"bookingId": 1, "userId": 7, "amount": "1500.00", "idempotencyKey": "k1"});
    create_order(&fx, first).await;

    let other = json!({"bookingId": 2, "userId": 7, "amount": "99.00", "idempotencyKey": "k1"});
    let (status, body) = post_json(fx.router(), "/api/v1/payments/orders", other).await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    assert_eq!(body["code"], 4009);
    assert_eq!(fx.gateway.calls(), 1);
    assert!(fx.store.find_by_booking(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_is_paid_at_most_once() {
    let fx = PaymentFixture::new(Script::Succeed);
    let first = create_order(&fx, order_body()).await;
    let second = create_order(&fx, order_body()).await;
    let first_id = first["gatewayOrderId"].as_str().unwrap().to_string();
    let second_id = second["gatewayOrderId"].as_str().unwrap().to_string();

    let (status, _) = post_json(
        fx.router(),
        "/api/v1/payments/verify",
        json!({
            "orderId": first_id,
            "gatewayPaymentId": "pay_1",
            "signature": payment_signature(&first_id, "pay_1"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        fx.router(),
        "/api/v1/payments/verify",
        json!({
            "orderId": second_id,
            "gatewayPaymentId": "pay_2",
            "signature": payment_signature(&second_id, "pay_2"),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    assert_eq!(body["code"], 4009);

    // A late capture for the second order is reported, not applied
    let event = captured_event("pay_2", &second_id);
    let (status, body) = post_webhook(fx.router(), &event, Some(&webhook_signature(&event))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "conflict");

    let completed = fx
        .store
        .find_by_booking(1)
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.status == PaymentStatus::Completed)
        .count();
    assert_eq!(completed, 1);
}

#[tokio::test]
async fn test_payment_lookup_errors() {
    let fx = PaymentFixture::new(Script::Succeed);

    let (status, body) = get(fx.router(), "/api/v1/payments/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4004);

    let (status, body) = get(fx.router(), "/api/v1/payments/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_health_reports_store() {
    let fx = PaymentFixture::new(Script::Succeed);
    let (status, body) = get(fx.router(), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service"], "payment");
    assert_eq!(body["data"]["store"], "memory");
    assert!(body["data"]["timestamp_ms"].as_u64().unwrap() > 0);
}
