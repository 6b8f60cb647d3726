use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthenticatedUser, Operation};
use crate::error::ApiError;
use crate::folio::{
    Charge, ChargeFilter, CreateChargeRequest, CreatePaymentRequest, FolioBalance, Payment,
    PaymentFilter, UpdatePaymentStatusRequest,
};
use crate::query::{Page, PageRequest};
use crate::AppState;

/// POST /api/charges
pub async fn create_charge_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateChargeRequest>,
) -> Result<(StatusCode, Json<Charge>), ApiError> {
    user.authorize(Operation::FolioWrite)?;
    request.validate()?;
    let charge = state.folio_service.post_charge(&user, request).await?;
    Ok((StatusCode::CREATED, Json(charge)))
}

/// GET /api/charges
pub async fn list_charges_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<ChargeFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Charge>>, ApiError> {
    user.authorize(Operation::FolioRead)?;
    Ok(Json(state.folio_service.list_charges(filter, page).await?))
}

/// POST /api/payments
pub async fn create_payment_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    user.authorize(Operation::FolioWrite)?;
    request.validate()?;
    let payment = state.folio_service.record_payment(&user, request).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /api/payments
pub async fn list_payments_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<PaymentFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Payment>>, ApiError> {
    user.authorize(Operation::FolioRead)?;
    Ok(Json(state.folio_service.list_payments(filter, page).await?))
}

/// PATCH /api/payments/:id/status
pub async fn update_payment_status_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<Payment>, ApiError> {
    user.authorize(Operation::FolioWrite)?;
    request.validate()?;
    Ok(Json(
        state.folio_service.update_payment_status(&user, id, request).await?,
    ))
}

/// GET /api/reservations/:id/charges
pub async fn reservation_charges_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Vec<Charge>>, ApiError> {
    user.authorize(Operation::FolioRead)?;
    Ok(Json(state.folio_service.reservation_charges(reservation_id).await?))
}

/// GET /api/reservations/:id/payments
pub async fn reservation_payments_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    user.authorize(Operation::FolioRead)?;
    Ok(Json(state.folio_service.reservation_payments(reservation_id).await?))
}

/// Folio balance for a reservation
#[utoipa::path(
    get,
    path = "/api/reservations/{id}/balance",
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Charges minus completed payments", body = FolioBalance),
        (status = 404, description = "Reservation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "folio"
)]
pub async fn reservation_balance_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<FolioBalance>, ApiError> {
    user.authorize(Operation::FolioRead)?;
    Ok(Json(state.folio_service.balance(reservation_id).await?))
}
