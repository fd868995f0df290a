//! Authentication DTOs

use chrono::{DateTime, Utc};
use rentwheels_core::models::UserInfo;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Customer registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    /// Email address, unique across users
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// 10-digit mobile number
    #[validate(length(equal = 10, message = "Mobile number must be 10 digits"))]
    pub mobile: String,

    /// Plain-text password, hashed before storage
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response with token
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// JWT bearer token
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// Authenticated user
    pub user: UserInfo,
}

/// Current user response
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: UserInfo,
    pub token_expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            mobile: "9876543210".to_string(),
            password: "a-long-password".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "asha@example.com".to_string(),
            password: "password".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = LoginRequest {
            email: "asha@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(empty.validate().is_err());
    }
}
