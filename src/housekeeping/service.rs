use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::housekeeping::{
    CreateTaskRequest, HousekeepingRepository, HousekeepingTask, TaskFilter, TaskStatus,
    UpdateTaskRequest,
};
use crate::query::{Page, PageRequest};
use crate::rooms::RoomRepository;

/// Housekeeping tasks; COMPLETED tasks are frozen
#[derive(Clone)]
pub struct HousekeepingService {
    repo: HousekeepingRepository,
    rooms: RoomRepository,
}

impl HousekeepingService {
    pub fn new(repo: HousekeepingRepository, rooms: RoomRepository) -> Self {
        Self { repo, rooms }
    }

    pub async fn create(&self, request: CreateTaskRequest) -> Result<HousekeepingTask, ApiError> {
        let room = self
            .rooms
            .find_room(request.room_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Room", request.room_id))?;
        if room.property_id != request.property_id {
            return Err(ApiError::invalid_field(
                "room_id",
                "property_mismatch",
                "Room belongs to a different property",
            ));
        }

        let task = self.repo.create(&request).await?;
        info!(task_id = %task.id, room = %room.number, "Created housekeeping task");
        Ok(task)
    }

    pub async fn list(&self, filter: TaskFilter, page: PageRequest) -> Result<Page<HousekeepingTask>, ApiError> {
        Ok(self.repo.list(&filter, page).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<HousekeepingTask, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("HousekeepingTask", id))
    }

    pub async fn update(&self, id: Uuid, request: UpdateTaskRequest) -> Result<HousekeepingTask, ApiError> {
        let mut tx = self.repo.pool().begin().await?;

        let current = HousekeepingRepository::lock(&mut *tx, id)
            .await?
            .ok_or_else(|| ApiError::not_found("HousekeepingTask", id))?;
        if current.status == TaskStatus::Completed {
            let next = request.status.unwrap_or(TaskStatus::Completed);
            if !current.status.can_change_to(next) || request.title.is_some() || request.notes.is_some() {
                return Err(ApiError::precondition("Completed tasks cannot be modified"));
            }
            return Ok(current);
        }

        let task = HousekeepingRepository::update(&mut *tx, id, &request).await?;
        tx.commit().await?;

        info!(task_id = %id, status = %task.status, "Updated housekeeping task");
        Ok(task)
    }

    pub async fn update_status(&self, id: Uuid, status: TaskStatus) -> Result<HousekeepingTask, ApiError> {
        self.update(
            id,
            UpdateTaskRequest {
                title: None,
                status: Some(status),
                notes: None,
            },
        )
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.repo.pool().begin().await?;

        let current = HousekeepingRepository::lock(&mut *tx, id)
            .await?
            .ok_or_else(|| ApiError::not_found("HousekeepingTask", id))?;
        if current.status == TaskStatus::Completed {
            return Err(ApiError::precondition("Completed tasks cannot be deleted"));
        }

        HousekeepingRepository::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(task_id = %id, "Deleted housekeeping task");
        Ok(())
    }
}
