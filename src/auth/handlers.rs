// HTTP handlers for authentication and staff accounts

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{AuthResponse, CreateUserRequest, LoginRequest, UpdateUserRequest, UserResponse},
    policy::Operation,
};
use crate::error::ApiError;
use crate::query::{Page, PageRequest};
use crate::AppState;

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;
    let response = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(response))
}

/// GET /api/auth/me
pub async fn me_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let profile = state.auth_service.me(user.user_id).await?;
    Ok(Json(profile))
}

/// POST /api/users
pub async fn create_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    user.authorize(Operation::UserCreate)?;
    request.validate()?;
    let created = state.auth_service.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/users
pub async fn list_users_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    user.authorize(Operation::UserList)?;
    Ok(Json(state.auth_service.list_users(page).await?))
}

/// GET /api/users/:id
pub async fn get_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    user.authorize(Operation::UserRead)?;
    Ok(Json(state.auth_service.get_user(id).await?))
}

/// PATCH /api/users/:id
pub async fn update_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    user.authorize(Operation::UserUpdate)?;
    request.validate()?;
    Ok(Json(state.auth_service.update_user(&user, id, request).await?))
}

/// DELETE /api/users/:id
pub async fn delete_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.authorize(Operation::UserDelete)?;
    state.auth_service.delete_user(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
