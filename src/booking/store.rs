//! Store seams for the booking service
//!
//! `InventoryStore` is the room/booking collaborator, `IdentityDirectory` the
//! user collaborator. Both have a PostgreSQL and an in-memory implementation.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::models::{Booking, NewBooking, Room, StayRange};
use crate::core_types::{HotelId, RoomId, UserId};
use crate::error::StoreError;

/// User existence lookups
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError>;
}

/// Room and booking persistence
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;

    async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>, StoreError>;

    async fn rooms_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Room>, StoreError>;

    /// Rooms of `hotel_id` with no booking overlapping `stay`. Read-only.
    async fn rooms_without_overlap(
        &self,
        hotel_id: HotelId,
        stay: &StayRange,
    ) -> Result<Vec<Room>, StoreError>;

    async fn bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, StoreError>;

    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    /// Take an exclusive lease on one room row.
    ///
    /// While the lease is alive no other lease on the same room can be
    /// obtained. Dropping it without `commit_booking` discards all writes.
    /// Returns `None` if the room does not exist.
    async fn lock_room(&self, room_id: RoomId) -> Result<Option<Box<dyn RoomLease>>, StoreError>;

    /// Recompute every room's display flag as "no booking with
    /// `check_out > today`". Returns the number of rooms whose flag changed.
    async fn refresh_availability(&self, today: NaiveDate) -> Result<u64, StoreError>;
}

/// Exclusive hold on a room row for one booking attempt
#[async_trait]
pub trait RoomLease: Send {
    /// Room as read under the lock
    fn room(&self) -> &Room;

    /// Existing bookings of the leased room overlapping `stay`
    async fn find_bookings_overlapping(
        &mut self,
        stay: &StayRange,
    ) -> Result<Vec<Booking>, StoreError>;

    /// Write the booking, mark the room unavailable and release the lock.
    ///
    /// A lease commits at most once.
    async fn commit_booking(&mut self, booking: NewBooking) -> Result<Booking, StoreError>;
}
