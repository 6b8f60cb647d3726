// Stays are opened and closed by reservation check-in/check-out; these
// endpoints only read them and edit occupants or notes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, Operation};
use crate::error::ApiError;
use crate::query::{Page, PageRequest};
use crate::stays::{Stay, StayFilter, UpdateStayRequest};
use crate::AppState;

/// GET /api/stays
pub async fn list_stays_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<StayFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Stay>>, ApiError> {
    user.authorize(Operation::StayRead)?;
    Ok(Json(state.stay_repo.list(&filter, page).await?))
}

/// GET /api/stays/active
pub async fn active_stays_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(mut filter): Query<StayFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Stay>>, ApiError> {
    user.authorize(Operation::StayRead)?;
    filter.active = Some(true);
    Ok(Json(state.stay_repo.list(&filter, page).await?))
}

/// GET /api/stays/:id
pub async fn get_stay_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Stay>, ApiError> {
    user.authorize(Operation::StayRead)?;
    let stay = state
        .stay_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Stay", id))?;
    Ok(Json(stay))
}

/// PATCH /api/stays/:id
pub async fn update_stay_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStayRequest>,
) -> Result<Json<Stay>, ApiError> {
    user.authorize(Operation::StayUpdate)?;
    request.validate()?;

    let stay = state
        .stay_repo
        .update(id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found("Stay", id))?;
    info!(stay_id = %id, "Updated stay");
    Ok(Json(stay))
}

/// DELETE /api/stays/:id
pub async fn delete_stay_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.authorize(Operation::StayDelete)?;

    let stay = state
        .stay_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Stay", id))?;
    if stay.is_active() {
        return Err(ApiError::precondition(
            "Cannot delete an active stay; check the reservation out first",
        ));
    }

    if !state.stay_repo.delete_closed(id).await? {
        return Err(ApiError::not_found("Stay", id));
    }
    info!(stay_id = %id, "Deleted stay");
    Ok(StatusCode::NO_CONTENT)
}
