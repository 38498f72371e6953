//! API response envelope and error mapping
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `error_codes`: Numeric error codes per error class
//! - `ApiError`: Failure rendered as an envelope with an HTTP status

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::booking::BookingError;
use crate::error::ErrorKind;
use crate::payment::PaymentError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const SIGNATURE_MISMATCH: i32 = 1002;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4004;
    pub const CONFLICT: i32 = 4009;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const GATEWAY_ERROR: i32 = 5002;
    pub const SERVICE_UNAVAILABLE: i32 = 5003;
}

fn kind_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation => error_codes::INVALID_PARAMETER,
        ErrorKind::SignatureMismatch => error_codes::SIGNATURE_MISMATCH,
        ErrorKind::NotFound => error_codes::NOT_FOUND,
        ErrorKind::Conflict => error_codes::CONFLICT,
        ErrorKind::Gateway => error_codes::GATEWAY_ERROR,
        ErrorKind::Internal => error_codes::INTERNAL_ERROR,
    }
}

// ============================================================================
// ApiError
// ============================================================================

/// Error rendered as `ApiResponse` with a matching HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap data in a success envelope
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    /// Map an error class to status + code. Internal details are not exposed.
    pub fn from_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        let status =
            StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let msg = match kind {
            ErrorKind::Internal => "Internal server error".to_string(),
            _ => msg.into(),
        };
        Self::new(status, kind_code(kind), msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.code, self.msg))).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        if e.kind() == ErrorKind::Internal {
            tracing::error!(error = %e, code = e.code(), "Booking request failed");
        }
        ApiError::from_kind(e.kind(), e.to_string())
    }
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        match e.kind() {
            ErrorKind::Internal | ErrorKind::Gateway => {
                tracing::error!(error = %e, code = e.code(), "Payment request failed")
            }
            _ => tracing::debug!(error = %e, code = e.code(), "Payment request rejected"),
        }
        ApiError::from_kind(e.kind(), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(json, serde_json::json!({"code": 0, "msg": "ok", "data": 42}));
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error(4009, "taken")).unwrap();
        assert_eq!(json, serde_json::json!({"code": 4009, "msg": "taken"}));
    }

    #[test]
    fn test_booking_error_mapping() {
        let err: ApiError = BookingError::RoomUnavailable {
            room_id: 101,
            conflicting: vec![1],
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, error_codes::CONFLICT);

        let err: ApiError = BookingError::Store(StoreError::Corrupt("secret detail".into())).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.msg.contains("secret detail"));
    }

    #[test]
    fn test_payment_error_mapping() {
        let err: ApiError = PaymentError::SignatureMismatch {
            order_id: "order_1".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, error_codes::SIGNATURE_MISMATCH);

        let err: ApiError =
            PaymentError::Gateway(crate::payment::GatewayError::Timeout).into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }
}
