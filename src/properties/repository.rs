use sqlx::PgPool;
use uuid::Uuid;

use crate::properties::{CreatePropertyRequest, Property, UpdatePropertyRequest};

const PROPERTY_COLUMNS: &str =
    "id, name, address, city, state, zip_code, country, created_at, updated_at";

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreatePropertyRequest) -> Result<Property, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            INSERT INTO properties (name, address, city, state, zip_code, country)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.state)
        .bind(&request.zip_code)
        .bind(&request.country)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties ORDER BY name",
            PROPERTY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {} FROM properties WHERE id = $1",
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM properties WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdatePropertyRequest,
    ) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(&format!(
            r#"
            UPDATE properties
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                state = COALESCE($5, state),
                zip_code = COALESCE($6, zip_code),
                country = COALESCE($7, country),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.city)
        .bind(&request.state)
        .bind(&request.zip_code)
        .bind(&request.country)
        .fetch_optional(&self.pool)
        .await
    }
}
