//! Booking service end to end: availability, booking, conflicts

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use stayline::booking::{BookingError, BookingManager, BookingRequest};

fn request(user_id: i64, room_id: i64, check_in: &str, check_out: &str) -> BookingRequest {
    BookingRequest {
        user_id,
        room_id,
        check_in: date(check_in),
        check_out: date(check_out),
    }
}

fn room_ids(data: &serde_json::Value) -> Vec<i64> {
    let mut ids: Vec<i64> = data
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["roomId"].as_i64().unwrap())
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_book_then_search_excludes_room() {
    let inv = seeded_inventory().await;
    let app = || stayline::api::booking_router(booking_state(&inv));

    let (status, body) = get(
        app(),
        "/api/v1/availability?hotelId=1&checkIn=2024-06-01&checkOut=2024-06-03",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room_ids(&body["data"]), vec![101, 102]);

    let (status, body) = post_json(
        app(),
        "/api/v1/bookings",
        json!({"userId": 7, "roomId": 101, "checkIn": "2024-06-01", "checkOut": "2024-06-03"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["roomId"], 101);
    assert_eq!(body["data"]["totalAmount"], "1500.00");
    assert_eq!(body["data"]["checkIn"], "2024-06-01");

    let (_, body) = get(
        app(),
        "/api/v1/availability?hotelId=1&checkIn=2024-06-02&checkOut=2024-06-04",
    )
    .await;
    assert_eq!(room_ids(&body["data"]), vec![102]);

    // Arriving on the checkout day does not overlap
    let (_, body) = get(
        app(),
        "/api/v1/availability?hotelId=1&checkIn=2024-06-03&checkOut=2024-06-05",
    )
    .await;
    assert_eq!(room_ids(&body["data"]), vec![101, 102]);
}

#[tokio::test]
async fn test_overlapping_booking_conflicts() {
    let inv = seeded_inventory().await;
    let app = || stayline::api::booking_router(booking_state(&inv));

    let (status, _) = post_json(
        app(),
        "/api/v1/bookings",
        json!({"userId": 7, "roomId": 101, "checkIn": "2024-06-01", "checkOut": "2024-06-03"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        app(),
        "/api/v1/bookings",
        json!({"userId": 8, "roomId": 101, "checkIn": "2024-06-02", "checkOut": "2024-06-04"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4009);
    assert!(body.get("data").is_none());

    // Back-to-back stay on the same room succeeds
    let (status, body) = post_json(
        app(),
        "/api/v1/bookings",
        json!({"userId": 8, "roomId": 101, "checkIn": "2024-06-03", "checkOut": "2024-06-04"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, body) = get(app(), "/api/v1/bookings").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = get(app(), "/api/v1/bookings/user/8").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["checkIn"], "2024-06-03");
}

#[tokio::test]
async fn test_concurrent_overlapping_requests_exactly_one_wins() {
    let inv = seeded_inventory().await;
    for user in 10..20 {
        inv.add_user(user).await;
    }
    let manager = Arc::new(BookingManager::new(Arc::new(inv.clone()), Arc::new(inv.clone())));

    let mut handles = Vec::new();
    for user in 10..20 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager
                .book_room(request(user, 101, "2024-07-01", "2024-07-05"))
                .await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => wins += 1,
            Err(BookingError::RoomUnavailable { conflicting, .. }) => {
                assert_eq!(conflicting.len(), 1);
                conflicts += 1;
            }
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(conflicts, 9);
    assert_eq!(manager.all_bookings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejected_requests_write_nothing() {
    let inv = seeded_inventory().await;
    let app = || stayline::api::booking_router(booking_state(&inv));

    // Reversed range, caught by request validation
    let (status, body) = post_json(
        app(),
        "/api/v1/bookings",
        json!({"userId": 7, "roomId": 101, "checkIn": "2024-06-03", "checkOut": "2024-06-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);

    // Unknown user
    let (status, _) = post_json(
        app(),
        "/api/v1/bookings",
        json!({"userId": 999, "roomId": 101, "checkIn": "2024-06-01", "checkOut": "2024-06-03"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Unknown room
    let (status, _) = post_json(
        app(),
        "/api/v1/bookings",
        json!({"userId": 7, "roomId": 999, "checkIn": "2024-06-01", "checkOut": "2024-06-03"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Malformed body
    let (status, body) = post_json(app(), "/api/v1/bookings", json!({"userId": "seven"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);

    let (_, body) = get(app(), "/api/v1/bookings").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_availability_rejects_empty_range() {
    let inv = seeded_inventory().await;
    let app = stayline::api::booking_router(booking_state(&inv));

    let (status, body) = get(
        app,
        "/api/v1/availability?hotelId=1&checkIn=2024-06-03&checkOut=2024-06-03",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_hotel_rooms_show_display_flag() {
    let inv = seeded_inventory().await;
    let app = || stayline::api::booking_router(booking_state(&inv));

    post_json(
        app(),
        "/api/v1/bookings",
        json!({"userId": 7, "roomId": 102, "checkIn": "2024-06-01", "checkOut": "2024-06-03"}),
    )
    .await;

    let (status, body) = get(app(), "/api/v1/hotels/1/rooms").await;
    assert_eq!(status, StatusCode::OK);
    let rooms = body["data"].as_array().unwrap();
    assert_eq!(rooms.len(), 2);
    let flag = |id: i64| {
        rooms
            .iter()
            .find(|r| r["roomId"] == id)
            .map(|r| r["available"].as_bool().unwrap())
            .unwrap()
    };
    assert!(flag(101));
    assert!(!flag(102));
}
