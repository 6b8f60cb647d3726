// Append-only audit trail
//
// `record` runs on the caller's connection so the entry commits or rolls
// back together with the mutation it describes. There is no update or
// delete path; the table trigger rejects both.

use sqlx::{PgConnection, PgPool};

use crate::activity::{ActivityFilter, ActivityLog, NewActivity};
use crate::query::{fetch_page, Page, PageRequest};

const ACTIVITY_COLUMNS: &str =
    "id, property_id, user_id, action, details, entity_type, entity_id, created_at";

pub async fn record(conn: &mut PgConnection, entry: NewActivity) -> Result<ActivityLog, sqlx::Error> {
    let log = sqlx::query_as::<_, ActivityLog>(&format!(
        r#"
        INSERT INTO activity_logs (property_id, user_id, action, details, entity_type, entity_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        ACTIVITY_COLUMNS
    ))
    .bind(entry.property_id)
    .bind(entry.user_id)
    .bind(&entry.action)
    .bind(&entry.details)
    .bind(&entry.entity_type)
    .bind(entry.entity_id)
    .fetch_one(conn)
    .await?;

    tracing::debug!(
        activity_id = %log.id,
        action = %log.action,
        entity_id = %log.entity_id,
        "Recorded activity"
    );
    Ok(log)
}

/// Read side of the audit trail
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, entry: NewActivity) -> Result<ActivityLog, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        record(&mut conn, entry).await
    }

    /// Newest first; `id` breaks ties between entries from one transaction
    pub async fn list(
        &self,
        filter: &ActivityFilter,
        page: PageRequest,
    ) -> Result<Page<ActivityLog>, sqlx::Error> {
        fetch_page(
            &self.pool,
            &format!("SELECT {} FROM activity_logs", ACTIVITY_COLUMNS),
            "SELECT COUNT(*) FROM activity_logs",
            filter,
            "created_at DESC, id DESC",
            page,
        )
        .await
    }
}
