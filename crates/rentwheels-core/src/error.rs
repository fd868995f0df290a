//! Unified error handling for RentWheels
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single failed field check, collected during request validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The offending field, in the request's naming (e.g. `reference1Mobile`)
    pub field: String,
    /// Human-readable description of the failure
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Authentication Errors ====================
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    // ==================== Booking Lifecycle Errors ====================
    #[error("Cannot {action} a booking in status '{from}'")]
    InvalidTransition { from: String, action: String },

    #[error("Invalid rental duration: {0} hours (must be a positive multiple of 12)")]
    InvalidDuration(i32),

    #[error("Required documents missing: {}", .0.join(", "))]
    DocumentsMissing(Vec<String>),

    #[error("Payment verification failed. If any amount was deducted, please contact support")]
    PaymentVerificationFailed,

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error("Vehicle is not available for booking: {0}")]
    VehicleUnavailable(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    // ==================== Validation Errors ====================
    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ==================== External Service Errors ====================
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Document storage error: {0}")]
    Storage(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Render the collected field errors for the `Display` impl.
///
/// Shows the first message plus a count, since toast-style consumers surface
/// one message while the structured response body carries the full list.
fn format_field_errors(errors: &[FieldError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}

impl AppError {
    /// Build a validation error from a single failed field
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    /// Build an invalid-transition error from a status and the attempted action
    pub fn invalid_transition(from: impl ToString, action: impl Into<String>) -> Self {
        AppError::InvalidTransition {
            from: from.to_string(),
            action: action.into(),
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::InvalidInput(_)
            | AppError::MissingField(_)
            | AppError::InvalidDuration(_)
            | AppError::DocumentsMissing(_)
            | AppError::PaymentVerificationFailed => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::InvalidCredentials | AppError::InvalidToken(_) | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            AppError::Forbidden | AppError::Unauthorized(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::VehicleNotFound(_)
            | AppError::BookingNotFound(_)
            | AppError::UserNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::InvalidTransition { .. }
            | AppError::VehicleUnavailable(_)
            | AppError::Conflict(_)
            | AppError::AlreadyExists(_) => StatusCode::CONFLICT,

            // 502 Bad Gateway
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::TokenExpired => "token_expired",
            AppError::InvalidToken(_) => "invalid_token",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::PasswordHash(_) => "password_error",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::InvalidDuration(_) => "invalid_duration",
            AppError::DocumentsMissing(_) => "documents_missing",
            AppError::PaymentVerificationFailed => "payment_verification_failed",
            AppError::VehicleNotFound(_) => "vehicle_not_found",
            AppError::VehicleUnavailable(_) => "vehicle_unavailable",
            AppError::BookingNotFound(_) => "booking_not_found",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Gateway(_) => "gateway_error",
            AppError::Storage(_) => "storage_error",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            // Validation failures carry the full collected list so clients can
            // show every failed field, not just the first.
            AppError::Validation(errors) => json!({
                "error": self.error_code(),
                "message": self.to_string(),
                "status": status.as_u16(),
                "errors": errors,
            }),
            AppError::DocumentsMissing(kinds) => json!({
                "error": self.error_code(),
                "message": self.to_string(),
                "status": status.as_u16(),
                "missing": kinds,
            }),
            _ => json!({
                "error": self.error_code(),
                "message": self.to_string(),
                "status": status.as_u16(),
            }),
        };

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {}", field));
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        AppError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::BookingNotFound("b1".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::invalid_transition("completed", "review").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::PaymentVerificationFailed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DocumentsMissing(vec!["live_photo".to_string()]).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::InvalidCredentials.error_code(),
            "invalid_credentials"
        );
        assert_eq!(
            AppError::invalid_transition("paid", "review").error_code(),
            "invalid_transition"
        );
        assert_eq!(AppError::InvalidDuration(13).error_code(), "invalid_duration");
    }

    #[test]
    fn test_validation_display_summarizes() {
        let err = AppError::Validation(vec![
            FieldError::new("mobile", "Please enter a valid 10-digit mobile number"),
            FieldError::new("email", "Please enter a valid email address"),
        ]);
        let text = err.to_string();
        assert!(text.contains("valid 10-digit mobile number"));
        assert!(text.contains("1 more"));
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = AppError::invalid_transition("declined", "start");
        assert_eq!(
            err.to_string(),
            "Cannot start a booking in status 'declined'"
        );
    }

    #[test]
    fn test_from_validator_errors_collects_all() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 2, message = "too short"))]
            name: String,
            #[validate(email(message = "bad email"))]
            email: String,
        }

        let probe = Probe {
            name: "x".to_string(),
            email: "nope".to_string(),
        };
        let err: AppError = probe.validate().unwrap_err().into();
        match err {
            AppError::Validation(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
