// Authentication error types

use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::error::ApiError;

/// Authentication failures raised by token handling, login and the extractor
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("User no longer exists")]
    UnknownUser,

    #[error("Password hashing error")]
    PasswordHashError,

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::MissingToken
            | AuthError::UnknownUser => {
                warn!("Authentication rejected: {}", err);
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::PasswordHashError | AuthError::TokenGenerationError(_) => {
                error!("Authentication internal failure: {}", err);
                ApiError::InternalError(err.to_string())
            }
            AuthError::DatabaseError(db) => ApiError::from(db),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_auth_errors_map_to_401() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::MissingToken,
        ] {
            assert_eq!(ApiError::from(err).status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_internal_auth_errors_map_to_500() {
        assert_eq!(
            ApiError::from(AuthError::PasswordHashError).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
