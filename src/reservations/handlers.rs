use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, Operation};
use crate::error::ApiError;
use crate::query::{Page, PageRequest};
use crate::reservations::availability::DateRange;
use crate::reservations::{
    AssignRoomRequest, CancelReservationRequest, CheckInRequest, CheckOutRequest,
    CreateReservationRequest, Reservation, ReservationFilter, ReservationSummary,
    UpdateReservationRequest,
};
use crate::AppState;

/// Create a reservation
///
/// A room, when given, must be free for the dates. The confirmation code is
/// generated server-side.
#[utoipa::path(
    post,
    path = "/api/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Guest or room not found"),
        (status = 409, description = "Room is not available for the selected dates")
    ),
    security(("bearer_auth" = [])),
    tag = "reservations"
)]
pub async fn create_reservation_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    user.authorize(Operation::ReservationCreate)?;
    request.validate()?;
    let reservation = state.reservation_service.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /api/reservations
pub async fn list_reservations_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<ReservationFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ReservationSummary>>, ApiError> {
    user.authorize(Operation::ReservationRead)?;
    Ok(Json(state.reservation_service.list(filter, page).await?))
}

/// GET /api/reservations/:id
pub async fn get_reservation_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReservationSummary>, ApiError> {
    user.authorize(Operation::ReservationRead)?;
    Ok(Json(state.reservation_service.get(id).await?))
}

/// PATCH /api/reservations/:id
pub async fn update_reservation_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReservationRequest>,
) -> Result<Json<Reservation>, ApiError> {
    user.authorize(Operation::ReservationUpdate)?;
    request.validate()?;
    Ok(Json(state.reservation_service.update(&user, id, request).await?))
}

/// PUT /api/reservations/:id/room
pub async fn assign_room_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignRoomRequest>,
) -> Result<Json<Reservation>, ApiError> {
    user.authorize(Operation::ReservationTransition)?;
    request.validate()?;
    Ok(Json(
        state.reservation_service.reassign_room(&user, id, request).await?,
    ))
}

/// POST /api/reservations/:id/confirm
pub async fn confirm_reservation_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, ApiError> {
    user.authorize(Operation::ReservationTransition)?;
    Ok(Json(state.reservation_service.confirm(&user, id).await?))
}

/// Check a confirmed reservation in
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/check-in",
    params(("id" = Uuid, Path, description = "Reservation id")),
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in; stay opened", body = Reservation),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation is not CONFIRMED or has no room")
    ),
    security(("bearer_auth" = [])),
    tag = "reservations"
)]
pub async fn check_in_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CheckInRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    user.authorize(Operation::ReservationTransition)?;
    let request = body.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;
    Ok(Json(state.reservation_service.check_in(&user, id, request).await?))
}

/// POST /api/reservations/:id/check-out
pub async fn check_out_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CheckOutRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    user.authorize(Operation::ReservationTransition)?;
    let request = body.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;
    Ok(Json(state.reservation_service.check_out(&user, id, request).await?))
}

/// POST /api/reservations/:id/cancel
pub async fn cancel_reservation_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelReservationRequest>>,
) -> Result<Json<Reservation>, ApiError> {
    user.authorize(Operation::ReservationTransition)?;
    let request = body.map(|Json(r)| r).unwrap_or_default();
    request.validate()?;
    Ok(Json(state.reservation_service.cancel(&user, id, request).await?))
}

/// DELETE /api/reservations/:id
pub async fn delete_reservation_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.authorize(Operation::ReservationDelete)?;
    state.reservation_service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RoomAvailabilityQuery {
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub exclude_reservation_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomAvailabilityResponse {
    pub room_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub available: bool,
}

/// GET /api/rooms/:id/availability
pub async fn room_availability_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(room_id): Path<Uuid>,
    Query(query): Query<RoomAvailabilityQuery>,
) -> Result<Json<RoomAvailabilityResponse>, ApiError> {
    user.authorize(Operation::AvailabilityRead)?;
    let range = DateRange::new(query.check_in_date, query.check_out_date)?;

    state.room_service.get_room(room_id).await?;
    let available = state
        .reservation_service
        .is_room_available(room_id, range, query.exclude_reservation_id)
        .await?;

    Ok(Json(RoomAvailabilityResponse {
        room_id,
        check_in_date: range.start,
        check_out_date: range.end,
        available,
    }))
}
