//! Booking Transaction Manager
//!
//! `book_room` runs check-then-act under an exclusive room lease:
//!
//! ```text
//! validate range -> user exists? -> lock room -> overlap query -> insert + flag
//!                                      |              |
//!                                  NotFound        Conflict (lease dropped)
//! ```
//!
//! Two attempts on the same room serialize on the lease, so overlapping
//! requests can never both succeed.

use std::sync::Arc;

use super::error::BookingError;
use super::models::{Booking, BookingRequest, NewBooking, StayRange};
use super::store::{IdentityDirectory, InventoryStore};
use crate::core_types::UserId;

pub struct BookingManager {
    inventory: Arc<dyn InventoryStore>,
    identity: Arc<dyn IdentityDirectory>,
}

impl BookingManager {
    pub fn new(inventory: Arc<dyn InventoryStore>, identity: Arc<dyn IdentityDirectory>) -> Self {
        Self {
            inventory,
            identity,
        }
    }

    /// Atomically validate and create a booking.
    ///
    /// `total_amount` is the room price read under the lock.
    ///
    /// # Errors
    /// - `InvalidInput` unless `check_in < check_out`
    /// - `UserNotFound` / `RoomNotFound`
    /// - `RoomUnavailable` if any booking of the room overlaps the stay
    pub async fn book_room(&self, req: BookingRequest) -> Result<Booking, BookingError> {
        let stay = StayRange::new(req.check_in, req.check_out)?;

        if !self.identity.user_exists(req.user_id).await? {
            return Err(BookingError::UserNotFound(req.user_id));
        }

        let mut lease = self
            .inventory
            .lock_room(req.room_id)
            .await?
            .ok_or(BookingError::RoomNotFound(req.room_id))?;

        let conflicting = lease.find_bookings_overlapping(&stay).await?;
        if !conflicting.is_empty() {
            let conflicting: Vec<_> = conflicting.iter().map(|b| b.booking_id).collect();
            tracing::info!(
                room_id = req.room_id,
                user_id = req.user_id,
                check_in = %stay.check_in(),
                check_out = %stay.check_out(),
                ?conflicting,
                "Booking rejected: overlapping stay"
            );
            return Err(BookingError::RoomUnavailable {
                room_id: req.room_id,
                conflicting,
            });
        }

        let total_amount = lease.room().price;
        let booking = lease
            .commit_booking(NewBooking {
                user_id: req.user_id,
                room_id: req.room_id,
                stay,
                total_amount,
            })
            .await?;

        tracing::info!(
            booking_id = booking.booking_id,
            room_id = booking.room_id,
            user_id = booking.user_id,
            total_amount = %booking.total_amount,
            "Booking created"
        );
        Ok(booking)
    }

    pub async fn bookings_of_user(&self, user_id: UserId) -> Result<Vec<Booking>, BookingError> {
        Ok(self.inventory.bookings_by_user(user_id).await?)
    }

    pub async fn all_bookings(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(self.inventory.all_bookings().await?)
    }
}
