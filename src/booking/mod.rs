//! Booking service core
//!
//! # Architecture
//!
//! ```text
//! HTTP ──► AvailabilityService ──► InventoryStore (read-only overlap query)
//!     └──► BookingManager ──► IdentityDirectory (user exists?)
//!                         └──► InventoryStore::lock_room ──► RoomLease
//!                                (overlap check, insert, flag, commit)
//! AvailabilitySweeper ──► InventoryStore::refresh_availability (periodic)
//! ```
//!
//! The overlap predicate in [`models::ranges_overlap`] decides every booking.
//! `Room::available` is a display cache kept current by the sweep.

pub mod availability;
pub mod error;
pub mod manager;
pub mod memory;
pub mod models;
pub mod pg;
pub mod store;
pub mod sweep;

pub use availability::AvailabilityService;
pub use error::BookingError;
pub use manager::BookingManager;
pub use memory::InMemoryInventory;
pub use models::{Booking, BookingRequest, Room, StayRange};
pub use pg::{PgIdentityDirectory, PgInventoryStore};
pub use store::{IdentityDirectory, InventoryStore, RoomLease};
pub use sweep::AvailabilitySweeper;
