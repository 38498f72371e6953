//! HTTP surface of both services
//!
//! Every reply uses the `{code, msg, data}` envelope. Routes live under
//! `/api/v1`; Swagger UI is served at `/docs`.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use state::{BookingState, PaymentState};

/// Router of the booking service
pub fn booking_router(state: Arc<BookingState>) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::booking_health))
        .route("/availability", get(handlers::booking::get_availability))
        .route(
            "/hotels/{hotel_id}/rooms",
            get(handlers::booking::get_hotel_rooms),
        )
        .route(
            "/bookings",
            get(handlers::booking::list_bookings).post(handlers::booking::create_booking),
        )
        .route(
            "/bookings/user/{user_id}",
            get(handlers::booking::get_user_bookings),
        );

    Router::new()
        .nest("/api/v1", routes)
        .with_state(state)
        // Stateless, merged after with_state
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::BookingApiDoc::openapi()),
        )
}

/// Router of the payment service
pub fn payment_router(state: Arc<PaymentState>) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::payment_health))
        .route("/payments/orders", post(handlers::payment::create_order))
        .route("/payments/verify", post(handlers::payment::verify_payment))
        .route("/payments/webhook", post(handlers::payment::handle_webhook))
        .route("/payments/{payment_id}", get(handlers::payment::get_payment))
        .route(
            "/payments/booking/{booking_id}",
            get(handlers::payment::get_booking_payments),
        )
        .route(
            "/payments/user/{user_id}",
            get(handlers::payment::get_user_payments),
        );

    Router::new()
        .nest("/api/v1", routes)
        .with_state(state)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::PaymentApiDoc::openapi()),
        )
}

/// Bind and serve until the process exits
pub async fn serve(service: &str, host: &str, port: u16, app: Router) -> std::io::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(service, %addr, "listening");
    tracing::info!(service, "API docs: http://{}/docs", addr);

    axum::serve(listener, app).await
}
