//! Health check handlers

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Json, extract::State, http::StatusCode};
use utoipa::ToSchema;

use crate::api::state::{BookingState, PaymentState};
use crate::api::types::{ApiResponse, error_codes};
use crate::error::StoreError;

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "booking")]
    pub service: String,
    /// Backing store (`postgres` or `memory`)
    #[schema(example = "postgres")]
    pub store: String,
    /// Build commit hash
    pub version: String,
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
}

type HealthReply = (StatusCode, Json<ApiResponse<HealthResponse>>);

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Render a store probe. The store error is logged, never returned.
fn reply(service: &str, store: &str, probe: Result<(), StoreError>) -> HealthReply {
    match probe {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(HealthResponse {
                service: service.to_string(),
                store: store.to_string(),
                version: env!("GIT_HASH").to_string(),
                timestamp_ms: now_ms(),
            })),
        ),
        Err(e) => {
            tracing::error!("[HEALTH] {} store ping failed: {}", service, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    code: error_codes::SERVICE_UNAVAILABLE,
                    msg: "unavailable".to_string(),
                    data: None,
                }),
            )
        }
    }
}

/// Booking service health
///
/// - Healthy: 200 OK + {code: 0, data: {...}}
/// - Unhealthy: 503 Service Unavailable + {code: 5003, msg: "unavailable"}
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn booking_health(State(state): State<Arc<BookingState>>) -> HealthReply {
    let probe = state.inventory.health_check().await;
    reply("booking", state.inventory.name(), probe)
}

/// Payment service health
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn payment_health(State(state): State<Arc<PaymentState>>) -> HealthReply {
    let probe = state.store.health_check().await;
    reply("payment", state.store.name(), probe)
}
