// HTTP handlers for room types and rooms

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, Operation};
use crate::error::ApiError;
use crate::query::{Page, PageRequest};
use crate::rooms::{
    CreateRoomRequest, CreateRoomTypeRequest, Room, RoomFilter, RoomType, RoomTypeFilter,
    UpdateRoomRequest, UpdateRoomTypeRequest,
};
use crate::AppState;

pub async fn create_room_type_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateRoomTypeRequest>,
) -> Result<(StatusCode, Json<RoomType>), ApiError> {
    user.authorize(Operation::RoomTypeCreate)?;
    request.validate()?;
    let room_type = state.room_service.create_room_type(request).await?;
    Ok((StatusCode::CREATED, Json(room_type)))
}

pub async fn list_room_types_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<RoomTypeFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<RoomType>>, ApiError> {
    user.authorize(Operation::RoomTypeRead)?;
    Ok(Json(state.room_service.list_room_types(filter, page).await?))
}

pub async fn get_room_type_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomType>, ApiError> {
    user.authorize(Operation::RoomTypeRead)?;
    Ok(Json(state.room_service.get_room_type(id).await?))
}

pub async fn update_room_type_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoomTypeRequest>,
) -> Result<Json<RoomType>, ApiError> {
    user.authorize(Operation::RoomTypeUpdate)?;
    request.validate()?;
    Ok(Json(state.room_service.update_room_type(id, request).await?))
}

pub async fn delete_room_type_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.authorize(Operation::RoomTypeDelete)?;
    state.room_service.delete_room_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_room_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    user.authorize(Operation::RoomCreate)?;
    request.validate()?;
    let room = state.room_service.create_room(request).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn list_rooms_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<RoomFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Room>>, ApiError> {
    user.authorize(Operation::RoomRead)?;
    Ok(Json(state.room_service.list_rooms(filter, page).await?))
}

pub async fn get_room_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Room>, ApiError> {
    user.authorize(Operation::RoomRead)?;
    Ok(Json(state.room_service.get_room(id).await?))
}

pub async fn update_room_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoomRequest>,
) -> Result<Json<Room>, ApiError> {
    user.authorize(Operation::RoomUpdate)?;
    request.validate()?;
    Ok(Json(state.room_service.update_room(id, request).await?))
}

pub async fn delete_room_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.authorize(Operation::RoomDelete)?;
    state.room_service.delete_room(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
