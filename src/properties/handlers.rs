use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, Operation};
use crate::error::ApiError;
use crate::properties::{CreatePropertyRequest, Property, UpdatePropertyRequest};
use crate::AppState;

/// POST /api/properties
pub async fn create_property_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    user.authorize(Operation::PropertyCreate)?;
    request.validate()?;

    let property = state.property_repo.create(&request).await?;
    tracing::info!(property_id = %property.id, "Created property");
    Ok((StatusCode::CREATED, Json(property)))
}

/// GET /api/properties
pub async fn list_properties_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Property>>, ApiError> {
    user.authorize(Operation::PropertyRead)?;
    Ok(Json(state.property_repo.find_all().await?))
}

/// GET /api/properties/:id
pub async fn get_property_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Property>, ApiError> {
    user.authorize(Operation::PropertyRead)?;
    let property = state
        .property_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property", id))?;
    Ok(Json(property))
}

/// PATCH /api/properties/:id
pub async fn update_property_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePropertyRequest>,
) -> Result<Json<Property>, ApiError> {
    user.authorize(Operation::PropertyUpdate)?;
    request.validate()?;

    let property = state
        .property_repo
        .update(id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found("Property", id))?;
    tracing::info!(property_id = %id, "Updated property");
    Ok(Json(property))
}
