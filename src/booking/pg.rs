//! PostgreSQL inventory and identity store
//!
//! Room leases are database transactions holding a `SELECT ... FOR UPDATE`
//! lock on the room row. The overlap check, the booking insert and the flag
//! update all run inside that transaction.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Transaction};

use super::models::{Booking, NewBooking, Room, StayRange};
use super::store::{IdentityDirectory, InventoryStore, RoomLease};
use crate::core_types::{HotelId, RoomId, UserId};
use crate::db::SafeRow;
use crate::error::StoreError;

const ROOM_COLUMNS: &str = "room_id, hotel_id, room_number, room_type, price, available";
const BOOKING_COLUMNS: &str =
    "booking_id, user_id, room_id, check_in, check_out, total_amount, created_at";

fn row_to_room(row: &PgRow) -> Result<Room, StoreError> {
    Ok(Room {
        room_id: row.try_get_col("room_id")?,
        hotel_id: row.try_get_col("hotel_id")?,
        room_number: row.try_get_col("room_number")?,
        room_type: row.try_get_col("room_type")?,
        price: row.try_get_col("price")?,
        available: row.try_get_col("available")?,
    })
}

fn row_to_booking(row: &PgRow) -> Result<Booking, StoreError> {
    Ok(Booking {
        booking_id: row.try_get_col("booking_id")?,
        user_id: row.try_get_col("user_id")?,
        room_id: row.try_get_col("room_id")?,
        check_in: row.try_get_col("check_in")?,
        check_out: row.try_get_col("check_out")?,
        total_amount: row.try_get_col("total_amount")?,
        created_at: row.try_get_col("created_at")?,
    })
}

/// User lookups against the `users` table
pub struct PgIdentityDirectory {
    pool: PgPool,
}

impl PgIdentityDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityDirectory for PgIdentityDirectory {
    async fn user_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

/// Rooms and bookings in PostgreSQL
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM rooms WHERE room_id = $1",
            ROOM_COLUMNS
        ))
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_room).transpose()
    }

    async fn rooms_by_hotel(&self, hotel_id: HotelId) -> Result<Vec<Room>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM rooms WHERE hotel_id = $1 ORDER BY room_id",
            ROOM_COLUMNS
        ))
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_room).collect()
    }

    async fn rooms_without_overlap(
        &self,
        hotel_id: HotelId,
        stay: &StayRange,
    ) -> Result<Vec<Room>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM rooms r
            WHERE r.hotel_id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM bookings b
                  WHERE b.room_id = r.room_id
                    AND b.check_in < $3
                    AND b.check_out > $2
              )
            ORDER BY r.room_id
            "#,
            ROOM_COLUMNS
        ))
        .bind(hotel_id)
        .bind(stay.check_in())
        .bind(stay.check_out())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_room).collect()
    }

    async fn bookings_by_user(&self, user_id: UserId) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY booking_id",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings ORDER BY booking_id",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn lock_room(&self, room_id: RoomId) -> Result<Option<Box<dyn RoomLease>>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM rooms WHERE room_id = $1 FOR UPDATE",
            ROOM_COLUMNS
        ))
        .bind(room_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let room = row_to_room(&row)?;

        Ok(Some(Box::new(PgRoomLease { tx: Some(tx), room })))
    }

    async fn refresh_availability(&self, today: NaiveDate) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE rooms r
            SET available = NOT EXISTS (
                SELECT 1 FROM bookings b
                WHERE b.room_id = r.room_id AND b.check_out > $1
            )
            WHERE r.available <> (NOT EXISTS (
                SELECT 1 FROM bookings b
                WHERE b.room_id = r.room_id AND b.check_out > $1
            ))
            "#,
        )
        .bind(today)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Row lock on one room, released on commit or rollback
struct PgRoomLease {
    /// `None` once committed
    tx: Option<Transaction<'static, Postgres>>,
    room: Room,
}

impl PgRoomLease {
    fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, StoreError> {
        self.tx
            .as_mut()
            .ok_or_else(|| StoreError::Corrupt("room lease already committed".into()))
    }
}

#[async_trait]
impl RoomLease for PgRoomLease {
    fn room(&self) -> &Room {
        &self.room
    }

    async fn find_bookings_overlapping(
        &mut self,
        stay: &StayRange,
    ) -> Result<Vec<Booking>, StoreError> {
        let room_id = self.room.room_id;
        let tx = self.tx()?;
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE room_id = $1 AND check_in < $3 AND check_out > $2
            ORDER BY booking_id
            "#,
            BOOKING_COLUMNS
        ))
        .bind(room_id)
        .bind(stay.check_in())
        .bind(stay.check_out())
        .fetch_all(&mut **tx)
        .await?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn commit_booking(&mut self, new: NewBooking) -> Result<Booking, StoreError> {
        let tx = self.tx()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bookings (user_id, room_id, check_in, check_out, total_amount, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(new.user_id)
        .bind(new.room_id)
        .bind(new.stay.check_in())
        .bind(new.stay.check_out())
        .bind(new.total_amount)
        .fetch_one(&mut **tx)
        .await?;
        let booking = row_to_booking(&row)?;

        sqlx::query("UPDATE rooms SET available = FALSE WHERE room_id = $1")
            .bind(new.room_id)
            .execute(&mut **tx)
            .await?;

        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(booking)
    }
}
