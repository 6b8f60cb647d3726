use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::query::{fetch_page, Page, PageRequest};
use crate::rooms::{
    CreateRoomRequest, CreateRoomTypeRequest, Room, RoomFilter, RoomStatus, RoomType,
    RoomTypeFilter, UpdateRoomRequest, UpdateRoomTypeRequest,
};

const ROOM_TYPE_COLUMNS: &str = "id, property_id, name, capacity, amenities, created_at, updated_at";
const ROOM_COLUMNS: &str =
    "id, property_id, room_type_id, number, floor, status, notes, created_at, updated_at";

/// Repository for room types and rooms
#[derive(Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ---- room types ----

    pub async fn create_room_type(&self, request: &CreateRoomTypeRequest) -> Result<RoomType, sqlx::Error> {
        sqlx::query_as::<_, RoomType>(&format!(
            r#"
            INSERT INTO room_types (property_id, name, capacity, amenities)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ROOM_TYPE_COLUMNS
        ))
        .bind(request.property_id)
        .bind(request.name.trim())
        .bind(request.capacity)
        .bind(&request.amenities)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_room_types(
        &self,
        filter: &RoomTypeFilter,
        page: PageRequest,
    ) -> Result<Page<RoomType>, sqlx::Error> {
        fetch_page(
            &self.pool,
            &format!("SELECT {} FROM room_types", ROOM_TYPE_COLUMNS),
            "SELECT COUNT(*) FROM room_types",
            filter,
            "name ASC, id ASC",
            page,
        )
        .await
    }

    pub async fn find_room_type(&self, id: Uuid) -> Result<Option<RoomType>, sqlx::Error> {
        sqlx::query_as::<_, RoomType>(&format!(
            "SELECT {} FROM room_types WHERE id = $1",
            ROOM_TYPE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_room_type(
        &self,
        id: Uuid,
        request: &UpdateRoomTypeRequest,
    ) -> Result<Option<RoomType>, sqlx::Error> {
        sqlx::query_as::<_, RoomType>(&format!(
            r#"
            UPDATE room_types
            SET name = COALESCE($2, name),
                capacity = COALESCE($3, capacity),
                amenities = COALESCE($4, amenities),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ROOM_TYPE_COLUMNS
        ))
        .bind(id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.capacity)
        .bind(&request.amenities)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_room_type(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM room_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- rooms ----

    pub async fn create_room(&self, request: &CreateRoomRequest) -> Result<Room, sqlx::Error> {
        sqlx::query_as::<_, Room>(&format!(
            r#"
            INSERT INTO rooms (property_id, room_type_id, number, floor, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            ROOM_COLUMNS
        ))
        .bind(request.property_id)
        .bind(request.room_type_id)
        .bind(request.number.trim())
        .bind(request.floor)
        .bind(request.status)
        .bind(&request.notes)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_rooms(&self, filter: &RoomFilter, page: PageRequest) -> Result<Page<Room>, sqlx::Error> {
        fetch_page(
            &self.pool,
            &format!("SELECT {} FROM rooms", ROOM_COLUMNS),
            "SELECT COUNT(*) FROM rooms",
            filter,
            "floor ASC, number ASC",
            page,
        )
        .await
    }

    pub async fn find_room(&self, id: Uuid) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>(&format!("SELECT {} FROM rooms WHERE id = $1", ROOM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn update_room(&self, id: Uuid, request: &UpdateRoomRequest) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>(&format!(
            r#"
            UPDATE rooms
            SET room_type_id = COALESCE($2, room_type_id),
                number = COALESCE($3, number),
                floor = COALESCE($4, floor),
                status = COALESCE($5, status),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ROOM_COLUMNS
        ))
        .bind(id)
        .bind(request.room_type_id)
        .bind(request.number.as_deref().map(str::trim))
        .bind(request.floor)
        .bind(request.status)
        .bind(&request.notes)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_room(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- transactional helpers ----

    /// Lock a room row for the rest of the transaction
    ///
    /// Serializes availability checks for the same room: a second writer
    /// blocks here until the first commits or rolls back.
    pub async fn lock_room(conn: &mut PgConnection, id: Uuid) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>(&format!(
            "SELECT {} FROM rooms WHERE id = $1 FOR UPDATE",
            ROOM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn set_status(conn: &mut PgConnection, id: Uuid, status: RoomStatus) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE rooms SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn number_of(conn: &mut PgConnection, id: Uuid) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT number FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}
