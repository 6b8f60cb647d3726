use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::query::{fetch_page, Page, PageRequest};
use crate::stays::{nights_between, NewStay, Stay, StayFilter, UpdateStayRequest};

const STAY_COLUMNS: &str = "id, property_id, reservation_id, room_id, guest_id, check_in_date, \
     check_out_date, number_of_nights, occupants, notes, created_at, updated_at";

#[derive(Clone)]
pub struct StayRepository {
    pool: PgPool,
}

impl StayRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &StayFilter, page: PageRequest) -> Result<Page<Stay>, sqlx::Error> {
        fetch_page(
            &self.pool,
            &format!("SELECT {} FROM stays", STAY_COLUMNS),
            "SELECT COUNT(*) FROM stays",
            filter,
            "check_in_date DESC, id DESC",
            page,
        )
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Stay>, sqlx::Error> {
        sqlx::query_as::<_, Stay>(&format!("SELECT {} FROM stays WHERE id = $1", STAY_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn update(&self, id: Uuid, request: &UpdateStayRequest) -> Result<Option<Stay>, sqlx::Error> {
        sqlx::query_as::<_, Stay>(&format!(
            r#"
            UPDATE stays
            SET occupants = COALESCE($2, occupants),
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            STAY_COLUMNS
        ))
        .bind(id)
        .bind(request.occupants)
        .bind(&request.notes)
        .fetch_optional(&self.pool)
        .await
    }

    /// Removes closed stays only; returns false when nothing matched
    pub async fn delete_closed(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stays WHERE id = $1 AND check_out_date IS NOT NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- used inside reservation transitions ----

    pub async fn open(conn: &mut PgConnection, stay: &NewStay) -> Result<Stay, sqlx::Error> {
        sqlx::query_as::<_, Stay>(&format!(
            r#"
            INSERT INTO stays (property_id, reservation_id, room_id, guest_id, check_in_date,
                               number_of_nights, occupants, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            STAY_COLUMNS
        ))
        .bind(stay.property_id)
        .bind(stay.reservation_id)
        .bind(stay.room_id)
        .bind(stay.guest_id)
        .bind(stay.check_in_date)
        .bind(stay.number_of_nights)
        .bind(stay.occupants)
        .bind(&stay.notes)
        .fetch_one(conn)
        .await
    }

    pub async fn find_open_for_reservation(
        conn: &mut PgConnection,
        reservation_id: Uuid,
    ) -> Result<Option<Stay>, sqlx::Error> {
        sqlx::query_as::<_, Stay>(&format!(
            "SELECT {} FROM stays WHERE reservation_id = $1 AND check_out_date IS NULL FOR UPDATE",
            STAY_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_optional(conn)
        .await
    }

    /// Close the open stay of a reservation, recomputing nights from the actual dates
    pub async fn close(
        conn: &mut PgConnection,
        reservation_id: Uuid,
        at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<Option<Stay>, sqlx::Error> {
        let Some(open) = Self::find_open_for_reservation(&mut *conn, reservation_id).await? else {
            return Ok(None);
        };

        let closed = sqlx::query_as::<_, Stay>(&format!(
            r#"
            UPDATE stays
            SET check_out_date = $2,
                number_of_nights = $3,
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            STAY_COLUMNS
        ))
        .bind(open.id)
        .bind(at)
        .bind(nights_between(open.check_in_date, at))
        .bind(notes)
        .fetch_one(conn)
        .await?;
        Ok(Some(closed))
    }

    /// Follow a room change on an in-house reservation
    pub async fn move_room(
        conn: &mut PgConnection,
        reservation_id: Uuid,
        room_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE stays SET room_id = $2, updated_at = NOW() \
             WHERE reservation_id = $1 AND check_out_date IS NULL",
        )
        .bind(reservation_id)
        .bind(room_id)
        .execute(conn)
        .await?;
        Ok(())
    }
}
