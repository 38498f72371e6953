//! Stayline - hotel booking and payment services
//!
//! Two independently deployed services share this crate:
//!
//! - [`booking`] - room availability queries and booking transactions
//! - [`payment`] - gateway orders, payment verification, webhook reconciliation
//! - [`api`] - axum routers, request validation and the response envelope
//! - [`config`] / [`logging`] - YAML configuration and tracing setup
//! - [`db`] - PostgreSQL pool and schema DDL
//! - [`money`] - major/minor currency unit conversion

pub mod core_types;

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod money;

pub mod booking;
pub mod payment;

pub mod api;

pub use core_types::{BookingId, HotelId, PaymentId, RoomId, UserId};
pub use error::{ErrorKind, StoreError};
