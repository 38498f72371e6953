//! Data models for rooms and bookings
//!
//! Records reference each other by id only. Loading related records is the
//! job of the store, never of the model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::error::BookingError;
use crate::core_types::{BookingId, HotelId, RoomId, UserId};

/// Half-open interval overlap: `[a_in, a_out)` collides with `[b_in, b_out)`.
///
/// This is the only collision rule for date ranges. SQL queries in the
/// PostgreSQL store spell out the same predicate.
#[inline]
pub fn ranges_overlap(
    a_in: NaiveDate,
    a_out: NaiveDate,
    b_in: NaiveDate,
    b_out: NaiveDate,
) -> bool {
    a_in < b_out && a_out > b_in
}

/// Validated stay `[check_in, check_out)`.
///
/// Fields are private to force validation through `new()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    /// # Errors
    /// `BookingError::InvalidInput` unless `check_in < check_out`
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_in >= check_out {
            return Err(BookingError::InvalidInput(format!(
                "checkIn ({}) must be before checkOut ({})",
                check_in, check_out
            )));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn overlaps(&self, other: &StayRange) -> bool {
        ranges_overlap(self.check_in, self.check_out, other.check_in, other.check_out)
    }
}

/// Room record
///
/// `available` is a display cache: `false` while the room has a booking that
/// has not checked out yet. Booking decisions never read it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[schema(example = 101)]
    pub room_id: RoomId,
    #[schema(example = 1)]
    pub hotel_id: HotelId,
    #[schema(example = "101")]
    pub room_number: String,
    #[schema(example = "Deluxe")]
    pub room_type: String,
    #[schema(value_type = String, example = "1500.00")]
    pub price: Decimal,
    pub available: bool,
}

/// Booking record, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub room_id: RoomId,
    #[schema(value_type = String, example = "2024-06-01")]
    pub check_in: NaiveDate,
    #[schema(value_type = String, example = "2024-06-03")]
    pub check_out: NaiveDate,
    /// Room price snapshot at booking time
    #[schema(value_type = String, example = "1500.00")]
    pub total_amount: Decimal,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn overlaps(&self, stay: &StayRange) -> bool {
        ranges_overlap(
            self.check_in,
            self.check_out,
            stay.check_in(),
            stay.check_out(),
        )
    }
}

/// Booking about to be written inside a room lease
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub stay: StayRange,
    pub total_amount: Decimal,
}

/// Request to book a room, as received from the boundary
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}
