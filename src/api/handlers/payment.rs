//! Payment service handlers

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::HeaderMap,
};

use super::booking::path_id;
use crate::api::state::PaymentState;
use crate::api::types::{
    ApiResponse, ApiResult, CreateOrderRequest, ValidatedJson, VerifyPaymentRequest, ok,
};
use crate::core_types::{BookingId, PaymentId, UserId};
use crate::payment::webhook::SIGNATURE_HEADER;
use crate::payment::{OrderDescriptor, Payment, PaymentConfirmation, WebhookOutcome};

/// Create a gateway order for a booking
///
/// Persists a PENDING payment only after the gateway accepted the order.
#[utoipa::path(
    post,
    path = "/api/v1/payments/orders",
    request_body(content = CreateOrderRequest, description = "Order to create", content_type = "application/json"),
    responses(
        (status = 200, description = "Order created", body = OrderDescriptor, content_type = "application/json"),
        (status = 400, description = "Invalid amount or currency"),
        (status = 502, description = "Gateway failed or timed out")
    ),
    tag = "Payments"
)]
pub async fn create_order(
    State(state): State<Arc<PaymentState>>,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> ApiResult<OrderDescriptor> {
    ok(state.broker.create_order(req.into()).await?)
}

/// Verify a client-submitted payment signature
#[utoipa::path(
    post,
    path = "/api/v1/payments/verify",
    request_body(content = VerifyPaymentRequest, description = "Checkout result", content_type = "application/json"),
    responses(
        (status = 200, description = "Payment completed", body = PaymentConfirmation, content_type = "application/json"),
        (status = 400, description = "Invalid parameters or signature mismatch"),
        (status = 404, description = "Unknown order"),
        (status = 409, description = "Payment already finalized")
    ),
    tag = "Payments"
)]
pub async fn verify_payment(
    State(state): State<Arc<PaymentState>>,
    ValidatedJson(req): ValidatedJson<VerifyPaymentRequest>,
) -> ApiResult<PaymentConfirmation> {
    ok(state.reconciler.verify_payment(req.into()).await?)
}

/// Gateway webhook receiver
///
/// Always answers 200 so the gateway stops retrying; `data.outcome` tells
/// what happened (`applied`, `duplicate`, `ignored`, `unmatched`, `conflict`,
/// `rejected`, `error`).
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    request_body(content = String, description = "Raw gateway event JSON", content_type = "application/json"),
    params(("X-Razorpay-Signature" = String, Header, description = "Hex HMAC-SHA256 of the raw body")),
    responses(
        (status = 200, description = "Event acknowledged", content_type = "application/json")
    ),
    tag = "Payments"
)]
pub async fn handle_webhook(
    State(state): State<Arc<PaymentState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<ApiResponse<WebhookOutcome>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let outcome = state.reconciler.handle_webhook(&body, signature).await;
    Json(ApiResponse::success(outcome))
}

/// Payment by id
#[utoipa::path(
    get,
    path = "/api/v1/payments/{paymentId}",
    params(("paymentId" = i64, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment", body = Payment, content_type = "application/json"),
        (status = 404, description = "Unknown payment")
    ),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<Arc<PaymentState>>,
    payment_id: Result<Path<PaymentId>, PathRejection>,
) -> ApiResult<Payment> {
    let payment_id = path_id(payment_id)?;
    ok(state.broker.get_payment(payment_id).await?)
}

/// Payments of a booking
#[utoipa::path(
    get,
    path = "/api/v1/payments/booking/{bookingId}",
    params(("bookingId" = i64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Payments of the booking", body = Vec<Payment>, content_type = "application/json")
    ),
    tag = "Payments"
)]
pub async fn get_booking_payments(
    State(state): State<Arc<PaymentState>>,
    booking_id: Result<Path<BookingId>, PathRejection>,
) -> ApiResult<Vec<Payment>> {
    let booking_id = path_id(booking_id)?;
    ok(state.broker.payments_of_booking(booking_id).await?)
}

/// Payments of a user
#[utoipa::path(
    get,
    path = "/api/v1/payments/user/{userId}",
    params(("userId" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Payments of the user", body = Vec<Payment>, content_type = "application/json")
    ),
    tag = "Payments"
)]
pub async fn get_user_payments(
    State(state): State<Arc<PaymentState>>,
    user_id: Result<Path<UserId>, PathRejection>,
) -> ApiResult<Vec<Payment>> {
    let user_id = path_id(user_id)?;
    ok(state.broker.payments_of_user(user_id).await?)
}
