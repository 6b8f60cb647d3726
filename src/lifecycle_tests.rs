// Reservation lifecycle against a real database
//
// Each test gets a fresh database with the migrations applied. Run with
// `DATABASE_URL=postgres://... cargo test -- --ignored`.

use axum::http::StatusCode;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::folio::{CreateChargeRequest, FolioService};
use crate::reservations::{
    AssignRoomRequest, CancelReservationRequest, CheckInRequest, CheckOutRequest,
    CreateReservationRequest, Reservation, ReservationService, ReservationSource,
    ReservationStatus,
};
use crate::rooms::{RoomRepository, RoomService};

struct Fixture {
    property_id: Uuid,
    room_101: Uuid,
    room_102: Uuid,
    guest_id: Uuid,
    actor: AuthenticatedUser,
}

async fn seed(pool: &PgPool) -> Fixture {
    let property_id: Uuid = sqlx::query_scalar("INSERT INTO properties (name) VALUES ('Harbour Inn') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap();
    let room_type_id: Uuid = sqlx::query_scalar(
        "INSERT INTO room_types (property_id, name, capacity) VALUES ($1, 'Double', 2) RETURNING id",
    )
    .bind(property_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let mut rooms = Vec::new();
    for number in ["101", "102"] {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO rooms (property_id, room_type_id, number, floor) VALUES ($1, $2, $3, 1) RETURNING id",
        )
        .bind(property_id)
        .bind(room_type_id)
        .bind(number)
        .fetch_one(pool)
        .await
        .unwrap();
        rooms.push(id);
    }

    let guest_id: Uuid = sqlx::query_scalar(
        "INSERT INTO guests (property_id, first_name, last_name) VALUES ($1, 'Ada', 'Lovelace') RETURNING id",
    )
    .bind(property_id)
    .fetch_one(pool)
    .await
    .unwrap();

    Fixture {
        property_id,
        room_101: rooms[0],
        room_102: rooms[1],
        guest_id,
        actor: AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "manager@example.com".to_string(),
            name: "Manager".to_string(),
            role: Role::Manager,
        },
    }
}

fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 14, 0, 0).unwrap()
}

fn booking(f: &Fixture, room_id: Uuid, status: ReservationStatus, from: u32, to: u32) -> CreateReservationRequest {
    CreateReservationRequest {
        property_id: f.property_id,
        guest_id: f.guest_id,
        room_id: Some(room_id),
        status,
        source: ReservationSource::default(),
        check_in_date: march(from),
        check_out_date: march(to),
        number_of_guests: 2,
        number_of_rooms: 1,
        total_price: dec!(300.00),
        paid_amount: dec!(0),
        special_requests: None,
    }
}

async fn book(service: &ReservationService, f: &Fixture, room_id: Uuid, status: ReservationStatus, from: u32, to: u32) -> Reservation {
    service
        .create(&f.actor, booking(f, room_id, status, from, to))
        .await
        .unwrap()
}

async fn room_status(pool: &PgPool, room_id: Uuid) -> String {
    sqlx::query_scalar("SELECT status FROM rooms WHERE id = $1")
        .bind(room_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn audit_count(pool: &PgPool, entity_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs WHERE entity_id = $1")
        .bind(entity_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_room_101_is_never_double_booked(pool: PgPool) {
    let f = seed(&pool).await;
    let service = ReservationService::new(pool.clone());

    book(&service, &f, f.room_101, ReservationStatus::Confirmed, 10, 13).await;

    let overlapping = service
        .create(&f.actor, booking(&f, f.room_101, ReservationStatus::Confirmed, 12, 14))
        .await
        .unwrap_err();
    assert_eq!(overlapping.status_code(), StatusCode::CONFLICT);

    // Checkout day is free for the next arrival
    let adjacent = book(&service, &f, f.room_101, ReservationStatus::Confirmed, 13, 15).await;
    assert_eq!(adjacent.status, ReservationStatus::Confirmed);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE room_id = $1")
        .bind(f.room_101)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_confirming_into_a_taken_room_conflicts(pool: PgPool) {
    let f = seed(&pool).await;
    let service = ReservationService::new(pool.clone());

    let pending = book(&service, &f, f.room_101, ReservationStatus::Pending, 10, 13).await;
    book(&service, &f, f.room_101, ReservationStatus::Confirmed, 11, 12).await;

    let err = service.confirm(&f.actor, pending.id).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
    assert_eq!(service.get(pending.id).await.unwrap().reservation.status, ReservationStatus::Pending);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_second_cancel_is_rejected_and_not_audited(pool: PgPool) {
    let f = seed(&pool).await;
    let service = ReservationService::new(pool.clone());

    let reservation = book(&service, &f, f.room_101, ReservationStatus::Confirmed, 10, 13).await;
    let cancelled = service
        .cancel(&f.actor, reservation.id, CancelReservationRequest::default())
        .await
        .unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);

    let err = service
        .cancel(&f.actor, reservation.id, CancelReservationRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    // created + cancelled
    assert_eq!(audit_count(&pool, reservation.id).await, 2);

    // The freed room can be booked again
    book(&service, &f, f.room_101, ReservationStatus::Confirmed, 10, 13).await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_check_in_and_out_drive_stay_and_room(pool: PgPool) {
    let f = seed(&pool).await;
    let service = ReservationService::new(pool.clone());

    let reservation = book(&service, &f, f.room_101, ReservationStatus::Confirmed, 10, 13).await;
    let checked_in = service
        .check_in(&f.actor, reservation.id, CheckInRequest::default())
        .await
        .unwrap();
    assert_eq!(checked_in.status, ReservationStatus::CheckedIn);
    assert_eq!(room_status(&pool, f.room_101).await, "OCCUPIED");

    let (open_stays, nights, occupants): (i64, i32, i32) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FILTER (WHERE check_out_date IS NULL), MAX(number_of_nights), MAX(occupants)
        FROM stays WHERE reservation_id = $1
        "#,
    )
    .bind(reservation.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(open_stays, 1);
    assert_eq!(nights, 3);
    assert_eq!(occupants, 2);

    let checked_out = service
        .check_out(&f.actor, reservation.id, CheckOutRequest::default())
        .await
        .unwrap();
    assert_eq!(checked_out.status, ReservationStatus::CheckedOut);
    assert_eq!(room_status(&pool, f.room_101).await, "CLEANING");

    let open_after: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM stays WHERE reservation_id = $1 AND check_out_date IS NULL",
    )
    .bind(reservation.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(open_after, 0);
    assert_eq!(audit_count(&pool, reservation.id).await, 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_check_out_without_open_stay_fails_and_rolls_back(pool: PgPool) {
    let f = seed(&pool).await;
    let service = ReservationService::new(pool.clone());

    let reservation = book(&service, &f, f.room_101, ReservationStatus::Confirmed, 10, 13).await;
    sqlx::query("UPDATE reservations SET status = 'CHECKED_IN' WHERE id = $1")
        .bind(reservation.id)
        .execute(&pool)
        .await
        .unwrap();

    let err = service
        .check_out(&f.actor, reservation.id, CheckOutRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InternalError(_)));

    let status: String = sqlx::query_scalar("SELECT status FROM reservations WHERE id = $1")
        .bind(reservation.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "CHECKED_IN");
    assert_eq!(room_status(&pool, f.room_101).await, "AVAILABLE");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_moving_in_house_guest_carries_stay(pool: PgPool) {
    let f = seed(&pool).await;
    let service = ReservationService::new(pool.clone());

    let reservation = book(&service, &f, f.room_101, ReservationStatus::Confirmed, 10, 13).await;
    service
        .check_in(&f.actor, reservation.id, CheckInRequest::default())
        .await
        .unwrap();

    let moved = service
        .reassign_room(&f.actor, reservation.id, AssignRoomRequest { room_id: f.room_102 })
        .await
        .unwrap();
    assert_eq!(moved.room_id, Some(f.room_102));
    assert_eq!(room_status(&pool, f.room_101).await, "CLEANING");
    assert_eq!(room_status(&pool, f.room_102).await, "OCCUPIED");

    let stay_room: Uuid = sqlx::query_scalar("SELECT room_id FROM stays WHERE reservation_id = $1")
        .bind(reservation.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stay_room, f.room_102);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_cancelled_folio_takes_no_charges(pool: PgPool) {
    let f = seed(&pool).await;
    let service = ReservationService::new(pool.clone());
    let folio = FolioService::new(pool.clone());

    let reservation = book(&service, &f, f.room_101, ReservationStatus::Confirmed, 10, 13).await;
    let charge = |description: &str| CreateChargeRequest {
        property_id: f.property_id,
        reservation_id: reservation.id,
        description: description.to_string(),
        amount: dec!(45.50),
        charge_type: "minibar".to_string(),
        notes: None,
    };

    folio.post_charge(&f.actor, charge("Minibar")).await.unwrap();
    assert_eq!(folio.balance(reservation.id).await.unwrap().balance, dec!(45.50));

    service
        .cancel(&f.actor, reservation.id, CancelReservationRequest::default())
        .await
        .unwrap();
    let err = folio.post_charge(&f.actor, charge("Late minibar")).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(folio.balance(reservation.id).await.unwrap().total_charges, dec!(45.50));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_room_with_completed_task_cannot_be_deleted(pool: PgPool) {
    let f = seed(&pool).await;
    let rooms = RoomService::new(RoomRepository::new(pool.clone()));

    sqlx::query(
        "INSERT INTO housekeeping_tasks (property_id, room_id, title, status) VALUES ($1, $2, 'Deep clean', 'COMPLETED')",
    )
    .bind(f.property_id)
    .bind(f.room_102)
    .execute(&pool)
    .await
    .unwrap();

    let err = rooms.delete_room(f.room_102).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);

    // The foreign key refuses a direct delete as well
    let direct = sqlx::query("DELETE FROM rooms WHERE id = $1")
        .bind(f.room_102)
        .execute(&pool)
        .await;
    assert!(direct.is_err());

    let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM housekeeping_tasks WHERE room_id = $1")
        .bind(f.room_102)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(tasks, 1);
}
