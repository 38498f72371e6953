//! Core types used throughout the system
//!
//! Both services key their records by numeric identifiers. Cross-service
//! references (a payment's `booking_id`, `user_id`) are plain numbers and are
//! never enforced by a database constraint.

/// User ID - owned by the identity collaborator.
pub type UserId = i64;

/// Hotel ID - owned by the hotel aggregate.
pub type HotelId = i64;

/// Room ID - unique across all hotels.
pub type RoomId = i64;

/// Booking ID - assigned by the booking store on insert.
pub type BookingId = i64;

/// Local payment ID - assigned by the payment store on insert.
///
/// Not to be confused with the gateway's payment identifier, which is a string.
pub type PaymentId = i64;
