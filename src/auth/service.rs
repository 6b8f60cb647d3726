// Authentication service - business logic layer

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{AuthResponse, CreateUserRequest, Role, UpdateUserRequest, UserResponse},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};
use crate::config::BootstrapManager;
use crate::error::ApiError;
use crate::query::{Page, PageRequest};

/// Coordinates login, token issuance and staff account management
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, token_service: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// Exchange email and password for an access token
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = match self.user_repo.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !PasswordService::verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.token_service.generate_access_token(
            user.id,
            &user.email,
            &user.name,
            user.role,
        )?;

        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_service.access_token_duration(),
            user: user.into(),
        })
    }

    /// Current user's profile
    pub async fn me(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or(AuthError::UnknownUser)
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, ApiError> {
        let hash = PasswordService::hash_password(&request.password)?;
        let user = self
            .user_repo
            .create(&request.email, &hash, &request.name, request.role)
            .await?;

        info!(user_id = %user.id, role = %user.role, "Created staff account");
        Ok(user.into())
    }

    pub async fn list_users(&self, page: PageRequest) -> Result<Page<UserResponse>, ApiError> {
        Ok(self.user_repo.list(page).await?)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserResponse, ApiError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| ApiError::not_found("User", id))
    }

    /// Managers may edit anyone; other staff may edit only themselves and
    /// cannot change their own role.
    pub async fn update_user(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        if actor.role != Role::Manager {
            if actor.user_id != id {
                return Err(ApiError::Forbidden(
                    "Only managers may update other staff accounts".to_string(),
                ));
            }
            if request.role.is_some() {
                return Err(ApiError::Forbidden(
                    "Only managers may change roles".to_string(),
                ));
            }
        }

        let password_hash = match &request.password {
            Some(password) => Some(PasswordService::hash_password(password)?),
            None => None,
        };

        let user = self
            .user_repo
            .update(
                id,
                request.email.as_deref(),
                password_hash.as_deref(),
                request.name.as_deref(),
                request.role,
            )
            .await?
            .ok_or_else(|| ApiError::not_found("User", id))?;

        info!(user_id = %user.id, "Updated staff account");
        Ok(user.into())
    }

    pub async fn delete_user(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<(), ApiError> {
        if actor.user_id == id {
            return Err(ApiError::precondition("You cannot delete your own account"));
        }
        if !self.user_repo.delete(id).await? {
            return Err(ApiError::not_found("User", id));
        }
        info!(user_id = %id, "Deleted staff account");
        Ok(())
    }

    /// Create the first manager when the users table is empty
    pub async fn ensure_bootstrap_manager(&self, manager: &BootstrapManager) -> Result<(), ApiError> {
        if self.user_repo.count().await? > 0 {
            return Ok(());
        }

        let hash = PasswordService::hash_password(&manager.password)?;
        let user = self
            .user_repo
            .create(&manager.email, &hash, &manager.name, Role::Manager)
            .await?;
        info!(user_id = %user.id, "Created bootstrap manager account");
        Ok(())
    }
}
