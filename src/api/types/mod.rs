//! HTTP request/response types

pub mod request;
pub mod response;

pub use request::{
    AvailabilityQuery, CreateBookingRequest, CreateOrderRequest, ValidatedJson,
    VerifyPaymentRequest,
};
pub use response::{ApiError, ApiResponse, ApiResult, error_codes, ok};
