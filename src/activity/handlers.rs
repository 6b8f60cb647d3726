use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::activity::{ActivityFilter, ActivityLog, CreateActivityRequest, NewActivity};
use crate::auth::{AuthenticatedUser, Operation};
use crate::error::ApiError;
use crate::query::{Page, PageRequest};
use crate::AppState;

/// POST /api/activity-logs
///
/// The actor is always the authenticated caller.
pub async fn create_activity_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityLog>), ApiError> {
    user.authorize(Operation::ActivityCreate)?;
    request.validate()?;

    let entry = NewActivity {
        property_id: request.property_id,
        user_id: user.user_id,
        action: request.action.trim().to_string(),
        entity_type: request.entity_type.trim().to_string(),
        entity_id: request.entity_id,
        details: request.details,
    };
    let log = state.activity_repo.create(entry).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// GET /api/activity-logs
pub async fn list_activity_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<ActivityFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ActivityLog>>, ApiError> {
    user.authorize(Operation::ActivityRead)?;
    Ok(Json(state.activity_repo.list(&filter, page).await?))
}

/// GET /api/activity-logs/entity/:entity_type/:entity_id
pub async fn entity_activity_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((entity_type, entity_id)): Path<(String, Uuid)>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ActivityLog>>, ApiError> {
    user.authorize(Operation::ActivityRead)?;
    let filter = ActivityFilter {
        entity_type: Some(entity_type),
        entity_id: Some(entity_id),
        ..Default::default()
    };
    Ok(Json(state.activity_repo.list(&filter, page).await?))
}

/// GET /api/activity-logs/user/:user_id
pub async fn user_activity_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ActivityLog>>, ApiError> {
    user.authorize(Operation::ActivityReadByUser)?;
    let filter = ActivityFilter {
        user_id: Some(user_id),
        ..Default::default()
    };
    Ok(Json(state.activity_repo.list(&filter, page).await?))
}
