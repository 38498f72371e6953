//! Request DTOs and the validating JSON extractor

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError, ValidationErrors};

use super::response::ApiError;
use crate::booking::BookingRequest;
use crate::core_types::{BookingId, HotelId, RoomId, UserId};
use crate::payment::{CreateOrderCommand, VerifyCommand};

// ============================================================================
// Validated JSON extractor
// ============================================================================

/// `Json<T>` that also runs `validator::Validate`.
///
/// Malformed JSON and failed rules are both rejected with a 400 envelope
/// before the handler runs.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send + 'static,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| {
                ApiError::bad_request(format!("Invalid JSON: {}", e.body_text()))
            })?;

        value
            .validate()
            .map_err(|e| ApiError::bad_request(describe_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten validator errors into `field: message; ...`
fn describe_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                // struct-level rules report under "__all__"
                if field.to_string() == "__all__" {
                    msg
                } else {
                    format!("{}: {}", field, msg)
                }
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

// ============================================================================
// Booking service
// ============================================================================

/// Query for `GET /availability`
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    #[param(example = 1)]
    pub hotel_id: HotelId,
    #[param(value_type = String, example = "2024-06-01")]
    pub check_in: NaiveDate,
    #[param(value_type = String, example = "2024-06-03")]
    pub check_out: NaiveDate,
}

fn validate_stay(req: &CreateBookingRequest) -> Result<(), ValidationError> {
    if req.check_in >= req.check_out {
        let mut err = ValidationError::new("stay_range");
        err.message = Some("checkIn must be before checkOut".into());
        return Err(err);
    }
    Ok(())
}

/// Body of `POST /bookings`
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_stay", skip_on_field_errors = false))]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "userId must be positive"))]
    #[schema(example = 7)]
    pub user_id: UserId,
    #[validate(range(min = 1, message = "roomId must be positive"))]
    #[schema(example = 101)]
    pub room_id: RoomId,
    #[schema(value_type = String, example = "2024-06-01")]
    pub check_in: NaiveDate,
    #[schema(value_type = String, example = "2024-06-03")]
    pub check_out: NaiveDate,
}

impl From<CreateBookingRequest> for BookingRequest {
    fn from(r: CreateBookingRequest) -> Self {
        BookingRequest {
            user_id: r.user_id,
            room_id: r.room_id,
            check_in: r.check_in,
            check_out: r.check_out,
        }
    }
}

// ============================================================================
// Payment service
// ============================================================================

/// Body of `POST /payments/orders`
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(range(min = 1, message = "bookingId must be positive"))]
    #[schema(example = 1)]
    pub booking_id: BookingId,
    #[validate(range(min = 1, message = "userId must be positive"))]
    #[schema(example = 7)]
    pub user_id: UserId,
    /// Major units, e.g. `1500.00`
    #[schema(value_type = String, example = "1500.00")]
    pub amount: Decimal,
    #[validate(length(equal = 3, message = "currency must be a 3-letter code"))]
    #[schema(example = "INR")]
    pub currency: Option<String>,
    #[validate(length(max = 40, message = "receipt must be at most 40 characters"))]
    pub receipt: Option<String>,
    /// Repeating a key returns the first order instead of creating another
    #[validate(length(min = 1, max = 64, message = "idempotencyKey must be 1-64 characters"))]
    pub idempotency_key: Option<String>,
}

impl From<CreateOrderRequest> for CreateOrderCommand {
    fn from(r: CreateOrderRequest) -> Self {
        CreateOrderCommand {
            booking_id: r.booking_id,
            user_id: r.user_id,
            amount: r.amount,
            currency: r.currency,
            receipt: r.receipt,
            idempotency_key: r.idempotency_key,
        }
    }
}

/// Body of `POST /payments/verify`
///
/// Accepts the checkout widget's `razorpay*` field names as aliases.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(alias = "razorpayOrderId")]
    #[validate(length(min = 1, message = "orderId is required"))]
    #[schema(example = "order_Nx81d9TQwYdWq1")]
    pub order_id: String,
    #[serde(alias = "razorpayPaymentId")]
    #[validate(length(min = 1, message = "gatewayPaymentId is required"))]
    #[schema(example = "pay_Nx82aWmYqJ3tQa")]
    pub gateway_payment_id: String,
    #[serde(alias = "razorpaySignature")]
    #[validate(length(min = 1, message = "signature is required"))]
    pub signature: String,
}

impl From<VerifyPaymentRequest> for VerifyCommand {
    fn from(r: VerifyPaymentRequest) -> Self {
        VerifyCommand {
            gateway_order_id: r.order_id,
            gateway_payment_id: r.gateway_payment_id,
            signature: r.signature,
        }
    }
}
