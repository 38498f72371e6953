//! OpenAPI / Swagger UI documentation
//!
//! Each service serves its own document:
//! - Swagger UI: `http://<host>:<port>/docs`
//! - OpenAPI JSON: `http://<host>:<port>/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::api::handlers::HealthResponse;
use crate::api::types::{CreateBookingRequest, CreateOrderRequest, VerifyPaymentRequest};
use crate::booking::{Booking, Room};
use crate::payment::{OrderDescriptor, Payment, PaymentConfirmation, PaymentStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stayline Booking API",
        version = "1.0.0",
        description = "Room availability and booking transactions.",
        license(name = "MIT")
    ),
    servers((url = "http://localhost:8081", description = "Development")),
    paths(
        crate::api::handlers::health::booking_health,
        crate::api::handlers::booking::get_availability,
        crate::api::handlers::booking::get_hotel_rooms,
        crate::api::handlers::booking::create_booking,
        crate::api::handlers::booking::list_bookings,
        crate::api::handlers::booking::get_user_bookings,
    ),
    components(schemas(HealthResponse, Room, Booking, CreateBookingRequest)),
    tags(
        (name = "System", description = "Health"),
        (name = "Availability", description = "Room availability queries"),
        (name = "Bookings", description = "Booking transactions"),
    )
)]
pub struct BookingApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stayline Payment API",
        version = "1.0.0",
        description = "Gateway orders, payment verification and webhook reconciliation.",
        license(name = "MIT")
    ),
    servers((url = "http://localhost:8082", description = "Development")),
    paths(
        crate::api::handlers::health::payment_health,
        crate::api::handlers::payment::create_order,
        crate::api::handlers::payment::verify_payment,
        crate::api::handlers::payment::handle_webhook,
        crate::api::handlers::payment::get_payment,
        crate::api::handlers::payment::get_booking_payments,
        crate::api::handlers::payment::get_user_payments,
    ),
    components(schemas(
        HealthResponse,
        Payment,
        PaymentStatus,
        OrderDescriptor,
        PaymentConfirmation,
        CreateOrderRequest,
        VerifyPaymentRequest,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Payments", description = "Orders, verification and webhooks"),
    )
)]
pub struct PaymentApiDoc;
