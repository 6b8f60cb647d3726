use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, Operation};
use crate::error::ApiError;
use crate::guests::{CreateGuestRequest, Guest, GuestFilter, UpdateGuestRequest};
use crate::query::{Page, PageRequest};
use crate::AppState;

/// POST /api/guests
pub async fn create_guest_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateGuestRequest>,
) -> Result<(StatusCode, Json<Guest>), ApiError> {
    user.authorize(Operation::GuestCreate)?;
    request.validate()?;
    let guest = state.guest_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(guest)))
}

/// GET /api/guests?property_id=&search=&page=&limit=
pub async fn list_guests_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<GuestFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Guest>>, ApiError> {
    user.authorize(Operation::GuestRead)?;
    Ok(Json(state.guest_service.list(filter, page).await?))
}

/// GET /api/guests/:id
pub async fn get_guest_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Guest>, ApiError> {
    user.authorize(Operation::GuestRead)?;
    Ok(Json(state.guest_service.get(id).await?))
}

/// PATCH /api/guests/:id
pub async fn update_guest_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGuestRequest>,
) -> Result<Json<Guest>, ApiError> {
    user.authorize(Operation::GuestUpdate)?;
    request.validate()?;
    Ok(Json(state.guest_service.update(id, request).await?))
}

/// DELETE /api/guests/:id
pub async fn delete_guest_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.authorize(Operation::GuestDelete)?;
    state.guest_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
