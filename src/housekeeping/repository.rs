use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::housekeeping::{CreateTaskRequest, HousekeepingTask, TaskFilter, UpdateTaskRequest};
use crate::query::{fetch_page, Page, PageRequest};

const TASK_COLUMNS: &str = "id, property_id, room_id, title, status, notes, created_at, updated_at";

#[derive(Clone)]
pub struct HousekeepingRepository {
    pool: PgPool,
}

impl HousekeepingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn create(&self, request: &CreateTaskRequest) -> Result<HousekeepingTask, sqlx::Error> {
        sqlx::query_as::<_, HousekeepingTask>(&format!(
            r#"
            INSERT INTO housekeeping_tasks (property_id, room_id, title, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(request.property_id)
        .bind(request.room_id)
        .bind(request.title.trim())
        .bind(&request.notes)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list(&self, filter: &TaskFilter, page: PageRequest) -> Result<Page<HousekeepingTask>, sqlx::Error> {
        fetch_page(
            &self.pool,
            &format!("SELECT {} FROM housekeeping_tasks", TASK_COLUMNS),
            "SELECT COUNT(*) FROM housekeeping_tasks",
            filter,
            "created_at DESC, id DESC",
            page,
        )
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<HousekeepingTask>, sqlx::Error> {
        sqlx::query_as::<_, HousekeepingTask>(&format!(
            "SELECT {} FROM housekeeping_tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<Option<HousekeepingTask>, sqlx::Error> {
        sqlx::query_as::<_, HousekeepingTask>(&format!(
            "SELECT {} FROM housekeeping_tasks WHERE id = $1 FOR UPDATE",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        request: &UpdateTaskRequest,
    ) -> Result<HousekeepingTask, sqlx::Error> {
        sqlx::query_as::<_, HousekeepingTask>(&format!(
            r#"
            UPDATE housekeeping_tasks
            SET title = COALESCE($2, title),
                status = COALESCE($3, status),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(request.title.as_deref().map(str::trim))
        .bind(request.status)
        .bind(&request.notes)
        .fetch_one(conn)
        .await
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM housekeeping_tasks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
