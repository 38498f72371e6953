//! DDL for the two independent stores.
//!
//! The booking store and the payment store live in separate databases; the
//! payment tables reference bookings and users by number only, with no
//! foreign key across the service boundary.

pub const BOOKING_SCHEMA: &[&str] = &[
    CREATE_USERS_TABLE,
    CREATE_ROOMS_TABLE,
    CREATE_ROOMS_HOTEL_INDEX,
    CREATE_BOOKINGS_TABLE,
    CREATE_BOOKINGS_ROOM_RANGE_INDEX,
    CREATE_BOOKINGS_USER_INDEX,
];

pub const PAYMENT_SCHEMA: &[&str] = &[
    CREATE_PAYMENTS_TABLE,
    CREATE_PAYMENTS_GATEWAY_PAYMENT_INDEX,
    CREATE_PAYMENTS_BOOKING_INDEX,
    CREATE_PAYMENTS_USER_INDEX,
    CREATE_PAYMENTS_BOOKING_COMPLETED_INDEX,
];

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id     BIGSERIAL PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const CREATE_ROOMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS rooms (
    room_id      BIGSERIAL PRIMARY KEY,
    hotel_id     BIGINT NOT NULL,
    room_number  TEXT NOT NULL,
    room_type    TEXT NOT NULL,
    price        NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
    available    BOOLEAN NOT NULL DEFAULT TRUE
)"#;

const CREATE_ROOMS_HOTEL_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_rooms_hotel ON rooms (hotel_id)";

const CREATE_BOOKINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS bookings (
    booking_id    BIGSERIAL PRIMARY KEY,
    user_id       BIGINT NOT NULL REFERENCES users (user_id),
    room_id       BIGINT NOT NULL REFERENCES rooms (room_id),
    check_in      DATE NOT NULL,
    check_out     DATE NOT NULL,
    total_amount  NUMERIC(12, 2) NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (check_in < check_out)
)"#;

const CREATE_BOOKINGS_ROOM_RANGE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_bookings_room_range ON bookings (room_id, check_in, check_out)";

const CREATE_BOOKINGS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_bookings_user ON bookings (user_id)";

const CREATE_PAYMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS payments (
    payment_id          BIGSERIAL PRIMARY KEY,
    booking_id          BIGINT NOT NULL,
    user_id             BIGINT NOT NULL,
    amount              NUMERIC(12, 2) NOT NULL CHECK (amount > 0),
    currency            TEXT NOT NULL,
    gateway_order_id    TEXT NOT NULL UNIQUE,
    gateway_payment_id  TEXT,
    signature           TEXT,
    status              TEXT NOT NULL,
    receipt             TEXT NOT NULL,
    idempotency_key     TEXT UNIQUE,
    error_message       VARCHAR(500),
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    completed_at        TIMESTAMPTZ
)"#;

const CREATE_PAYMENTS_GATEWAY_PAYMENT_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_payments_gateway_payment ON payments (gateway_payment_id)";

const CREATE_PAYMENTS_BOOKING_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_payments_booking ON payments (booking_id)";

const CREATE_PAYMENTS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_payments_user ON payments (user_id)";

/// At most one `COMPLETED` payment per booking
pub const PAYMENTS_BOOKING_COMPLETED_INDEX: &str = "uq_payments_booking_completed";

const CREATE_PAYMENTS_BOOKING_COMPLETED_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS uq_payments_booking_completed \
     ON payments (booking_id) WHERE status = 'COMPLETED'";
