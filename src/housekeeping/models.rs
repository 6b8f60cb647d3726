use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::query::{Criteria, FilterBuilder};
use crate::validation::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// A completed task keeps its status; re-sending COMPLETED is a no-op
    pub fn can_change_to(&self, next: TaskStatus) -> bool {
        *self != TaskStatus::Completed || next == TaskStatus::Completed
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HousekeepingTask {
    pub id: Uuid,
    pub property_id: Uuid,
    pub room_id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    pub property_id: Uuid,
    pub room_id: Uuid,
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

/// Query filters for `GET /api/housekeeping`
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub property_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub search: Option<String>,
}

impl Criteria for TaskFilter {
    fn apply<'a>(&'a self, filter: &mut FilterBuilder<'a>) {
        filter
            .eq("property_id", self.property_id)
            .eq("room_id", self.room_id)
            .eq("status", self.status)
            .search(&["title", "notes"], self.search.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_is_final() {
        for next in TaskStatus::ALL {
            let allowed = TaskStatus::Completed.can_change_to(next);
            assert_eq!(allowed, next == TaskStatus::Completed, "COMPLETED -> {}", next);
        }
    }

    #[test]
    fn test_open_tasks_move_freely() {
        assert!(TaskStatus::Pending.can_change_to(TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.can_change_to(TaskStatus::Completed));
        assert!(TaskStatus::Cancelled.can_change_to(TaskStatus::Pending));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
    }
}
