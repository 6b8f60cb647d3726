use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, Operation};
use crate::error::ApiError;
use crate::housekeeping::{
    CreateTaskRequest, HousekeepingTask, TaskFilter, UpdateTaskRequest, UpdateTaskStatusRequest,
};
use crate::query::{Page, PageRequest};
use crate::AppState;

pub async fn create_task_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<HousekeepingTask>), ApiError> {
    user.authorize(Operation::HousekeepingCreate)?;
    request.validate()?;
    let task = state.housekeeping_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<TaskFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<HousekeepingTask>>, ApiError> {
    user.authorize(Operation::HousekeepingRead)?;
    Ok(Json(state.housekeeping_service.list(filter, page).await?))
}

pub async fn get_task_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<HousekeepingTask>, ApiError> {
    user.authorize(Operation::HousekeepingRead)?;
    Ok(Json(state.housekeeping_service.get(id).await?))
}

pub async fn update_task_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<HousekeepingTask>, ApiError> {
    user.authorize(Operation::HousekeepingUpdate)?;
    request.validate()?;
    Ok(Json(state.housekeeping_service.update(id, request).await?))
}

pub async fn update_task_status_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskStatusRequest>,
) -> Result<Json<HousekeepingTask>, ApiError> {
    user.authorize(Operation::HousekeepingUpdate)?;
    Ok(Json(
        state.housekeeping_service.update_status(id, request.status).await?,
    ))
}

pub async fn delete_task_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.authorize(Operation::HousekeepingDelete)?;
    state.housekeeping_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
