pub mod booking;
pub mod health;
pub mod payment;

pub use health::{HealthResponse, booking_health, payment_health};
