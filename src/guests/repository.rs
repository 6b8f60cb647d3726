use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::guests::{CreateGuestRequest, Guest, GuestFilter, UpdateGuestRequest};
use crate::query::{fetch_page, Page, PageRequest};

const GUEST_COLUMNS: &str = "id, property_id, first_name, last_name, email, phone, address, city, \
     state, zip_code, country, notes, created_at, updated_at";

/// Repository for guest profiles
#[derive(Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

impl GuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn create(&self, request: &CreateGuestRequest) -> Result<Guest, sqlx::Error> {
        sqlx::query_as::<_, Guest>(&format!(
            r#"
            INSERT INTO guests (property_id, first_name, last_name, email, phone, address,
                                city, state, zip_code, country, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            GUEST_COLUMNS
        ))
        .bind(request.property_id)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.state)
        .bind(&request.zip_code)
        .bind(&request.country)
        .bind(&request.notes)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list(&self, filter: &GuestFilter, page: PageRequest) -> Result<Page<Guest>, sqlx::Error> {
        fetch_page(
            &self.pool,
            &format!("SELECT {} FROM guests", GUEST_COLUMNS),
            "SELECT COUNT(*) FROM guests",
            filter,
            "last_name ASC, first_name ASC, id ASC",
            page,
        )
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Guest>, sqlx::Error> {
        sqlx::query_as::<_, Guest>(&format!("SELECT {} FROM guests WHERE id = $1", GUEST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn update(&self, id: Uuid, request: &UpdateGuestRequest) -> Result<Option<Guest>, sqlx::Error> {
        sqlx::query_as::<_, Guest>(&format!(
            r#"
            UPDATE guests
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                city = COALESCE($7, city),
                state = COALESCE($8, state),
                zip_code = COALESCE($9, zip_code),
                country = COALESCE($10, country),
                notes = COALESCE($11, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            GUEST_COLUMNS
        ))
        .bind(id)
        .bind(request.first_name.as_deref().map(str::trim))
        .bind(request.last_name.as_deref().map(str::trim))
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.state)
        .bind(&request.zip_code)
        .bind(&request.country)
        .bind(&request.notes)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Guest lookup on a transaction's connection
    pub async fn fetch(conn: &mut PgConnection, id: Uuid) -> Result<Option<Guest>, sqlx::Error> {
        sqlx::query_as::<_, Guest>(&format!("SELECT {} FROM guests WHERE id = $1", GUEST_COLUMNS))
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}
