//! Availability Query Engine
//!
//! Read-only: computes which rooms of a hotel have no booking overlapping a
//! requested stay. Never consults or mutates the stored `available` flag.

use std::sync::Arc;

use chrono::NaiveDate;

use super::error::BookingError;
use super::models::{Room, StayRange};
use super::store::InventoryStore;
use crate::core_types::HotelId;

pub struct AvailabilityService {
    inventory: Arc<dyn InventoryStore>,
}

impl AvailabilityService {
    pub fn new(inventory: Arc<dyn InventoryStore>) -> Self {
        Self { inventory }
    }

    /// Rooms of `hotel_id` bookable for `[check_in, check_out)`.
    ///
    /// # Errors
    /// - `InvalidInput` unless `check_in < check_out`
    /// - `Store` on backend failure
    pub async fn find_available_rooms(
        &self,
        hotel_id: HotelId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Room>, BookingError> {
        let stay = StayRange::new(check_in, check_out)?;
        let rooms = self.inventory.rooms_without_overlap(hotel_id, &stay).await?;

        tracing::debug!(
            hotel_id,
            check_in = %check_in,
            check_out = %check_out,
            rooms = rooms.len(),
            "Availability computed"
        );
        Ok(rooms)
    }

    /// Every room of a hotel with its display flag
    pub async fn rooms_of_hotel(&self, hotel_id: HotelId) -> Result<Vec<Room>, BookingError> {
        Ok(self.inventory.rooms_by_hotel(hotel_id).await?)
    }
}
