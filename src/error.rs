// Error handling module for the hotel PMS API
// Provides centralized error types and HTTP response conversion

use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};
use validator::{ValidationError, ValidationErrors};

/// Postgres SQLSTATE for an exclusion constraint violation
const EXCLUSION_VIOLATION: &str = "23P01";

/// Main error type for the API
/// All handlers should return Result<T, ApiError>
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(ValidationErrors),

    /// Malformed input that is not tied to a single DTO field
    /// Maps to HTTP 400 Bad Request
    InvalidInput { message: String },

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Availability overlap, duplicate key or protected deletion
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Operation is not legal in the entity's current state
    /// Maps to HTTP 422 Unprocessable Entity
    PreconditionFailed { message: String },

    /// The confirmation code generator could not find a free code
    /// Maps to HTTP 500, treated as a fatal configuration error
    ConfirmationCodeExhausted { attempts: u32 },

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    DatabaseError(sqlx::Error),

    /// Internal server errors
    InternalError(String),

    /// Authentication failures
    Unauthorized(String),

    /// Authorization failures
    Forbidden(String),
}

/// Consistent error response structure
///
/// Every error leaves the API in this shape: a machine-readable
/// `error_code`, a human-readable `message`, optional `details`
/// (field-level validation errors) and an RFC 3339 `timestamp`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ApiError::PreconditionFailed {
            message: message.into(),
        }
    }

    /// Build a single-field validation error
    pub fn invalid_field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut error = ValidationError::new(code);
        error.message = Some(Cow::Borrowed(message));

        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        ApiError::ValidationError(errors)
    }

    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logging follows severity: `error!` for 500-level failures,
    /// `warn!` for rejected operations, `debug!` for expected client errors.
    /// Database and internal details never reach the client.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                let mut response = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed");
                response.details = Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({})));
                (StatusCode::BAD_REQUEST, response)
            }
            ApiError::InvalidInput { message } => {
                debug!("Invalid input: {}", message);
                (StatusCode::BAD_REQUEST, ErrorResponse::new("VALIDATION_ERROR", message.clone()))
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("NOT_FOUND", format!("{} with id {} not found", resource, id)),
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                (StatusCode::CONFLICT, ErrorResponse::new("CONFLICT", message.clone()))
            }
            ApiError::PreconditionFailed { message } => {
                warn!("Precondition failed: {}", message);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new("PRECONDITION_FAILED", message.clone()),
                )
            }
            ApiError::ConfirmationCodeExhausted { attempts } => {
                error!(
                    "Confirmation code generator exhausted after {} attempts; check clock and randomness source",
                    attempts
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "CONFIRMATION_CODE_EXHAUSTED",
                        "Could not allocate a unique confirmation code",
                    ),
                )
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("DATABASE_ERROR", "A database error occurred"),
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred"),
                )
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                (StatusCode::UNAUTHORIZED, ErrorResponse::new("UNAUTHORIZED", message.clone()))
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                (StatusCode::FORBIDDEN, ErrorResponse::new("FORBIDDEN", message.clone()))
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::PreconditionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ConfirmationCodeExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Convert sqlx errors to ApiError
///
/// Constraint violations surface as conflicts so a racing writer that
/// slipped past the application check still gets a 409, not a 500.
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &error {
            if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) {
                return ApiError::conflict("Room is not available for the selected dates");
            }
            if db_err.is_unique_violation() {
                let message = match db_err.constraint() {
                    Some("rooms_property_number_key") => "Room number already exists in this property",
                    Some("room_types_property_name_key") => "Room type name already exists in this property",
                    Some("users_email_lower_idx") => "Email already exists",
                    Some("stays_reservation_key") => "Stay already exists for this reservation",
                    Some("reservations_confirmation_code_key") => "Confirmation code already in use",
                    _ => "Resource already exists",
                };
                return ApiError::conflict(message);
            }
            if db_err.is_foreign_key_violation() {
                return ApiError::conflict("Resource is referenced by other records");
            }
            if db_err.is_check_violation() {
                return ApiError::InvalidInput {
                    message: format!(
                        "Value violates constraint {}",
                        db_err.constraint().unwrap_or("unknown")
                    ),
                };
            }
        }
        ApiError::DatabaseError(error)
    }
}

/// Convert validator errors to ApiError
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("Room", "x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("taken").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::precondition("must be confirmed").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::ConfirmationCodeExhausted { attempts: 5 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_precondition_distinct_from_conflict() {
        let (status, body) = ApiError::precondition("Only confirmed reservations can be checked in")
            .to_error_response();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error_code, "PRECONDITION_FAILED");
        assert_eq!(body.message, "Only confirmed reservations can be checked in");

        let (status, body) = ApiError::conflict("Room is not available").to_error_response();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error_code, "CONFLICT");
    }

    #[test]
    fn test_invalid_field_carries_details() {
        let (status, body) = ApiError::invalid_field(
            "check_out_date",
            "date_range",
            "check_out_date must be after check_in_date",
        )
        .to_error_response();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error_code, "VALIDATION_ERROR");
        let details = body.details.unwrap();
        assert!(details.get("check_out_date").is_some());
    }

    #[test]
    fn test_internal_details_hidden() {
        let (_, body) = ApiError::InternalError("secret stack trace".into()).to_error_response();
        assert!(!body.message.contains("secret"));

        let (_, body) = ApiError::DatabaseError(sqlx::Error::RowNotFound).to_error_response();
        assert_eq!(body.error_code, "DATABASE_ERROR");
        assert!(!body.message.contains("RowNotFound"));
    }
}
