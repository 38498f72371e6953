//! Booking error types

use thiserror::Error;

use crate::core_types::{BookingId, RoomId, UserId};
use crate::error::{ErrorKind, StoreError};

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User not found with ID: {0}")]
    UserNotFound(UserId),

    #[error("Room not found with ID: {0}")]
    RoomNotFound(RoomId),

    #[error("Room {room_id} is already booked for the requested dates")]
    RoomUnavailable {
        room_id: RoomId,
        conflicting: Vec<BookingId>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::InvalidInput(_) => ErrorKind::Validation,
            BookingError::UserNotFound(_) | BookingError::RoomNotFound(_) => ErrorKind::NotFound,
            BookingError::RoomUnavailable { .. } => ErrorKind::Conflict,
            BookingError::Store(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn http_status(&self) -> u16 {
        self.kind().http_status()
    }
}
