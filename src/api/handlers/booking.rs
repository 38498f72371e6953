//! Booking service handlers

use std::sync::Arc;

use axum::extract::{
    Path, Query, State,
    rejection::{PathRejection, QueryRejection},
};

use crate::api::state::BookingState;
use crate::api::types::{
    ApiError, ApiResult, AvailabilityQuery, CreateBookingRequest, ValidatedJson, ok,
};
use crate::booking::{Booking, Room};
use crate::core_types::{HotelId, UserId};

/// Unwrap a path id, rejecting with the JSON envelope instead of plain text
pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = path.map_err(|e| ApiError::bad_request(e.body_text()))?;
    if id <= 0 {
        return Err(ApiError::bad_request(format!("id must be positive: {}", id)));
    }
    Ok(id)
}

/// Rooms of a hotel free for a whole stay
///
/// A room qualifies when none of its bookings overlaps `[checkIn, checkOut)`.
/// A stay starting on another guest's checkout day is free.
#[utoipa::path(
    get,
    path = "/api/v1/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Available rooms", body = Vec<Room>, content_type = "application/json"),
        (status = 400, description = "Invalid date range"),
        (status = 500, description = "Store failure")
    ),
    tag = "Availability"
)]
pub async fn get_availability(
    State(state): State<Arc<BookingState>>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> ApiResult<Vec<Room>> {
    let Query(q) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let rooms = state
        .availability
        .find_available_rooms(q.hotel_id, q.check_in, q.check_out)
        .await?;
    ok(rooms)
}

/// Every room of a hotel with its display availability flag
#[utoipa::path(
    get,
    path = "/api/v1/hotels/{hotelId}/rooms",
    params(("hotelId" = i64, Path, description = "Hotel id")),
    responses(
        (status = 200, description = "Rooms of the hotel", body = Vec<Room>, content_type = "application/json"),
        (status = 400, description = "Invalid hotel id")
    ),
    tag = "Availability"
)]
pub async fn get_hotel_rooms(
    State(state): State<Arc<BookingState>>,
    hotel_id: Result<Path<HotelId>, PathRejection>,
) -> ApiResult<Vec<Room>> {
    let hotel_id = path_id(hotel_id)?;
    ok(state.availability.rooms_of_hotel(hotel_id).await?)
}

/// Book a room for a stay
///
/// Fails with 409 if another booking of the room overlaps the stay.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body(content = CreateBookingRequest, description = "Stay to book", content_type = "application/json"),
    responses(
        (status = 200, description = "Booking created", body = Booking, content_type = "application/json"),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Unknown user or room"),
        (status = 409, description = "Room already booked for an overlapping stay")
    ),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<Arc<BookingState>>,
    ValidatedJson(req): ValidatedJson<CreateBookingRequest>,
) -> ApiResult<Booking> {
    let booking = state.manager.book_room(req.into()).await?;
    ok(booking)
}

/// All bookings
#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    responses(
        (status = 200, description = "All bookings", body = Vec<Booking>, content_type = "application/json")
    ),
    tag = "Bookings"
)]
pub async fn list_bookings(State(state): State<Arc<BookingState>>) -> ApiResult<Vec<Booking>> {
    ok(state.manager.all_bookings().await?)
}

/// Bookings of one user
#[utoipa::path(
    get,
    path = "/api/v1/bookings/user/{userId}",
    params(("userId" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Bookings of the user", body = Vec<Booking>, content_type = "application/json"),
        (status = 400, description = "Invalid user id")
    ),
    tag = "Bookings"
)]
pub async fn get_user_bookings(
    State(state): State<Arc<BookingState>>,
    user_id: Result<Path<UserId>, PathRejection>,
) -> ApiResult<Vec<Booking>> {
    let user_id = path_id(user_id)?;
    ok(state.manager.bookings_of_user(user_id).await?)
}
