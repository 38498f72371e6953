//! In-memory inventory and identity store
//!
//! Used for local runs (`storage: memory`) and tests. A room lease holds the
//! single store mutex, so booking attempts are fully serialized.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::models::{Booking, NewBooking, Room, StayRange};
use super::store::{IdentityDirectory, InventoryStore, RoomLease};
use crate::config::InventorySeed;
use crate::core_types::{BookingId, HotelId, RoomId, UserId};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct InventoryData {
    users: BTreeSet<UserId>,
    rooms: BTreeMap<RoomId, Room>,
    bookings: Vec<Booking>,
    last_booking_id: BookingId,
}

impl InventoryData {
    fn overlapping(&self, room_id: RoomId, stay: &StayRange) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| b.room_id == room_id && b.overlaps(stay))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryInventory {
    inner: Arc<Mutex<InventoryData>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user_id: UserId) {
        self.inner.lock().await.users.insert(user_id);
    }

    /// Insert or replace a room
    pub async fn add_room(&self, room: Room) {
        self.inner.lock().await.rooms.insert(room.room_id, room);
    }

    /// Load fixture users and rooms from configuration
    pub async fn seed(&self, seed: &InventorySeed) {
        let mut data = self.inner.lock().await;
        data.users.extend(seed.users.iter().copied());
        for r in &seed.rooms {
            data.rooms.insert(
                r.room_id,
                Room {
                    room_id: r.room_id,
                    hotel_id: r.hotel_id,
                    room_number: r.room_number.clone(),
                    room_type: r.room_type.clone(),
                    price: r.price,
                    available: true,
                },
            );
        }
        tracing::info!(
            users = data.users.len(),
            rooms = data.rooms.len(),
            "In-memory inventory seeded"
        );
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryInventory {
    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.users.contains(&user_id))
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventory {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.inner.lock().await.rooms.get(&room_id).cloned())
    }

    async fn rooms_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Room>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data
            .rooms
            .values()
            .filter(|r| r.hotel_id == hotel_id)
            .cloned()
            .collect())
    }

    async fn rooms_without_overlap(
        &self,
        hotel_id: HotelId,
        stay: &StayRange,
    ) -> Result<Vec<Room>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data
            .rooms
            .values()
            .filter(|r| r.hotel_id == hotel_id)
            .filter(|r| data.overlapping(r.room_id, stay).is_empty())
            .cloned()
            .collect())
    }

    async fn bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, StoreError> {
        let data = self.inner.lock().await;
        Ok(data
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.inner.lock().await.bookings.clone())
    }

    async fn lock_room(&self, room_id: RoomId) -> Result<Option<Box<dyn RoomLease>>, StoreError> {
        let guard = self.inner.clone().lock_owned().await;
        let Some(room) = guard.rooms.get(&room_id).cloned() else {
            return Ok(None);
        };
        Ok(Some(Box::new(MemoryRoomLease {
            guard,
            room,
            committed: false,
        })))
    }

    async fn refresh_availability(&self, today: NaiveDate) -> Result<u64, StoreError> {
        let mut data = self.inner.lock().await;
        let occupied: BTreeSet<RoomId> = data
            .bookings
            .iter()
            .filter(|b| b.check_out > today)
            .map(|b| b.room_id)
            .collect();

        let mut changed = 0;
        for room in data.rooms.values_mut() {
            let available = !occupied.contains(&room.room_id);
            if room.available != available {
                room.available = available;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

struct MemoryRoomLease {
    guard: OwnedMutexGuard<InventoryData>,
    room: Room,
    committed: bool,
}

#[async_trait]
impl RoomLease for MemoryRoomLease {
    fn room(&self) -> &Room {
        &self.room
    }

    async fn find_bookings_overlapping(
        &mut self,
        stay: &StayRange,
    ) -> Result<Vec<Booking>, StoreError> {
        Ok(self.guard.overlapping(self.room.room_id, stay))
    }

    async fn commit_booking(&mut self, new: NewBooking) -> Result<Booking, StoreError> {
        if self.committed {
            return Err(StoreError::Corrupt("room lease already committed".into()));
        }
        let data = &mut *self.guard;
        data.last_booking_id += 1;
        let booking = Booking {
            booking_id: data.last_booking_id,
            user_id: new.user_id,
            room_id: new.room_id,
            check_in: new.stay.check_in(),
            check_out: new.stay.check_out(),
            total_amount: new.total_amount,
            created_at: Utc::now(),
        };
        data.bookings.push(booking.clone());
        if let Some(room) = data.rooms.get_mut(&new.room_id) {
            room.available = false;
        }
        self.committed = true;
        Ok(booking)
    }
}
