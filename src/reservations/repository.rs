use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::query::{fetch_page, Page, PageRequest};
use crate::reservations::{
    Reservation, ReservationFilter, ReservationSource, ReservationStatus, ReservationSummary,
};

const RESERVATION_COLUMNS: &str = "id, property_id, guest_id, room_id, status, source, \
     check_in_date, check_out_date, number_of_guests, number_of_rooms, total_price, paid_amount, \
     confirmation_code, special_requests, created_at, updated_at";

const SUMMARY_SELECT: &str = "SELECT r.id, r.property_id, r.guest_id, r.room_id, r.status, r.source, \
     r.check_in_date, r.check_out_date, r.number_of_guests, r.number_of_rooms, r.total_price, \
     r.paid_amount, r.confirmation_code, r.special_requests, r.created_at, r.updated_at, \
     g.first_name AS guest_first_name, g.last_name AS guest_last_name, g.email AS guest_email, \
     rm.number AS room_number \
     FROM reservations r \
     JOIN guests g ON g.id = r.guest_id \
     LEFT JOIN rooms rm ON rm.id = r.room_id";

const SUMMARY_COUNT: &str = "SELECT COUNT(*) FROM reservations r JOIN guests g ON g.id = r.guest_id";

/// Row values for a new reservation
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub room_id: Option<Uuid>,
    pub status: ReservationStatus,
    pub source: ReservationSource,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub number_of_guests: i32,
    pub number_of_rooms: i32,
    pub total_price: Decimal,
    pub paid_amount: Decimal,
    pub confirmation_code: String,
    pub special_requests: Option<String>,
}

/// Reservation persistence
///
/// Reads go through the pool. Writes are associated functions on a
/// `&mut PgConnection` so services can compose them in one transaction.
#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Reservation>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {} FROM reservations WHERE id = $1",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_summary(&self, id: Uuid) -> Result<Option<ReservationSummary>, sqlx::Error> {
        sqlx::query_as::<_, ReservationSummary>(&format!("{} WHERE r.id = $1", SUMMARY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> Result<Page<ReservationSummary>, sqlx::Error> {
        fetch_page(
            &self.pool,
            SUMMARY_SELECT,
            SUMMARY_COUNT,
            filter,
            "r.created_at DESC, r.id DESC",
            page,
        )
        .await
    }

    /// Load and lock a reservation row until the transaction ends
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Option<Reservation>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {} FROM reservations WHERE id = $1 FOR UPDATE",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn insert(conn: &mut PgConnection, new: &NewReservation) -> Result<Reservation, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            r#"
            INSERT INTO reservations (
                property_id, guest_id, room_id, status, source, check_in_date, check_out_date,
                number_of_guests, number_of_rooms, total_price, paid_amount,
                confirmation_code, special_requests
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(new.property_id)
        .bind(new.guest_id)
        .bind(new.room_id)
        .bind(new.status)
        .bind(new.source)
        .bind(new.check_in_date)
        .bind(new.check_out_date)
        .bind(new.number_of_guests)
        .bind(new.number_of_rooms)
        .bind(new.total_price)
        .bind(new.paid_amount)
        .bind(&new.confirmation_code)
        .bind(&new.special_requests)
        .fetch_one(conn)
        .await
    }

    /// Write back every editable column of `reservation`
    pub async fn save(conn: &mut PgConnection, reservation: &Reservation) -> Result<Reservation, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            r#"
            UPDATE reservations
            SET room_id = $2,
                status = $3,
                source = $4,
                check_in_date = $5,
                check_out_date = $6,
                number_of_guests = $7,
                number_of_rooms = $8,
                total_price = $9,
                paid_amount = $10,
                special_requests = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(reservation.id)
        .bind(reservation.room_id)
        .bind(reservation.status)
        .bind(reservation.source)
        .bind(reservation.check_in_date)
        .bind(reservation.check_out_date)
        .bind(reservation.number_of_guests)
        .bind(reservation.number_of_rooms)
        .bind(reservation.total_price)
        .bind(reservation.paid_amount)
        .bind(&reservation.special_requests)
        .fetch_one(conn)
        .await
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            "UPDATE reservations SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            RESERVATION_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_one(conn)
        .await
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
