// Read-only aggregation queries. A NULL property filter matches every property.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::reports::{ReservationBrief, RoomOccupancy, RoomStatusCount};

const BRIEF_SELECT: &str = r#"
    SELECT r.id, r.confirmation_code, r.status,
           g.first_name || ' ' || g.last_name AS guest_name,
           r.room_id, rm.number AS room_number,
           r.check_in_date, r.check_out_date
    FROM reservations r
    JOIN guests g ON g.id = r.guest_id
    LEFT JOIN rooms rm ON rm.id = r.room_id
"#;

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count_rooms(&self, property_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM rooms WHERE ($1::uuid IS NULL OR property_id = $1)",
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Distinct rooms held by CONFIRMED or CHECKED_IN reservations overlapping `[from, to)`
    pub async fn count_occupied_rooms(
        &self,
        property_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT room_id) FROM reservations
            WHERE ($1::uuid IS NULL OR property_id = $1)
              AND room_id IS NOT NULL
              AND status IN ('CONFIRMED', 'CHECKED_IN')
              AND check_in_date < $3
              AND check_out_date > $2
            "#,
        )
        .bind(property_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn count_checked_in_rooms(&self, property_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT room_id) FROM reservations
            WHERE ($1::uuid IS NULL OR property_id = $1)
              AND room_id IS NOT NULL
              AND status = 'CHECKED_IN'
            "#,
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn count_active_stays(&self, property_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM stays
            WHERE ($1::uuid IS NULL OR property_id = $1)
              AND check_out_date IS NULL
            "#,
        )
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Every room with the guest holding it at `at`, if any
    pub async fn room_breakdown(
        &self,
        property_id: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<Vec<RoomOccupancy>, sqlx::Error> {
        sqlx::query_as::<_, RoomOccupancy>(
            r#"
            SELECT rm.id AS room_id, rm.number AS room_number, rm.status, holder.guest_name
            FROM rooms rm
            LEFT JOIN LATERAL (
                SELECT g.first_name || ' ' || g.last_name AS guest_name
                FROM reservations r
                JOIN guests g ON g.id = r.guest_id
                WHERE r.room_id = rm.id
                  AND r.status IN ('CONFIRMED', 'CHECKED_IN')
                  AND r.check_in_date <= $2
                  AND r.check_out_date > $2
                ORDER BY r.check_in_date
                LIMIT 1
            ) holder ON TRUE
            WHERE ($1::uuid IS NULL OR rm.property_id = $1)
            ORDER BY rm.floor ASC, rm.number ASC
            "#,
        )
        .bind(property_id)
        .bind(at)
        .fetch_all(&self.pool)
        .await
    }

    /// Reservations whose check-in falls in `[from, to)`, regardless of status
    pub async fn arrivals(
        &self,
        property_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<ReservationBrief>, sqlx::Error> {
        sqlx::query_as::<_, ReservationBrief>(&format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR r.property_id = $1)
              AND r.check_in_date >= $2 AND r.check_in_date < $3
            ORDER BY r.check_in_date ASC, r.id ASC
            LIMIT $4
            "#,
            BRIEF_SELECT
        ))
        .bind(property_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Reservations whose check-out falls in `[from, to)`, regardless of status
    pub async fn departures(
        &self,
        property_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<Vec<ReservationBrief>, sqlx::Error> {
        sqlx::query_as::<_, ReservationBrief>(&format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR r.property_id = $1)
              AND r.check_out_date >= $2 AND r.check_out_date < $3
            ORDER BY r.check_out_date ASC, r.id ASC
            LIMIT $4
            "#,
            BRIEF_SELECT
        ))
        .bind(property_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// PENDING or CONFIRMED reservations arriving in `[from, to]`
    pub async fn upcoming(
        &self,
        property_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<ReservationBrief>, sqlx::Error> {
        sqlx::query_as::<_, ReservationBrief>(&format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR r.property_id = $1)
              AND r.status IN ('PENDING', 'CONFIRMED')
              AND r.check_in_date >= $2 AND r.check_in_date <= $3
            ORDER BY r.check_in_date ASC, r.id ASC
            LIMIT $4
            "#,
            BRIEF_SELECT
        ))
        .bind(property_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn room_status_counts(&self, property_id: Option<Uuid>) -> Result<Vec<RoomStatusCount>, sqlx::Error> {
        sqlx::query_as::<_, RoomStatusCount>(
            r#"
            SELECT status, COUNT(*) AS count FROM rooms
            WHERE ($1::uuid IS NULL OR property_id = $1)
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Non-cancelled, room-assigned reservations overlapping `[from, to)`
    pub async fn calendar(
        &self,
        property_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReservationBrief>, sqlx::Error> {
        sqlx::query_as::<_, ReservationBrief>(&format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR r.property_id = $1)
              AND r.room_id IS NOT NULL
              AND r.status <> 'CANCELLED'
              AND r.check_in_date < $3
              AND r.check_out_date > $2
            ORDER BY rm.number ASC, r.check_in_date ASC
            "#,
            BRIEF_SELECT
        ))
        .bind(property_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }
}
