//! JWT Claims structure
//!
//! Defines the claims structure used in JWT tokens for authentication.

use chrono::{Duration, Utc};
use rentwheels_core::models::UserRole;
use serde::{Deserialize, Serialize};

/// JWT Claims
///
/// Standard claims used in JWT tokens for user authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,

    /// User id
    pub uid: i32,

    /// User role
    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims for a user
    ///
    /// Expiration is left at zero and filled in by `JwtService` when the
    /// token is created.
    pub fn new(user_id: i32, email: &str, role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            sub: email.to_string(),
            uid: user_id,
            role,
            iat: now.timestamp(),
            exp: 0,
        }
    }

    /// Create new claims with custom expiration duration
    pub fn with_expiration(
        user_id: i32,
        email: &str,
        role: UserRole,
        expires_in_secs: i64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: email.to_string(),
            uid: user_id,
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the claims have expired
    pub fn is_expired(&self) -> bool {
        self.exp != 0 && self.exp < Utc::now().timestamp()
    }

    /// Check if the user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let claims = Claims::new(1, "admin@rentwheels.in", UserRole::Admin);
        assert_eq!(claims.sub, "admin@rentwheels.in");
        assert_eq!(claims.uid, 1);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp, 0);
        assert!(claims.is_admin());
    }

    #[test]
    fn test_with_expiration() {
        let claims = Claims::with_expiration(2, "user@example.com", UserRole::Customer, 3600);
        let now = Utc::now().timestamp();
        assert!(claims.exp > now);
        assert!(claims.exp <= now + 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expired_claims() {
        let claims = Claims::with_expiration(3, "old@example.com", UserRole::Customer, -60);
        assert!(claims.is_expired());
    }

    #[test]
    fn test_customer_is_not_admin() {
        let claims = Claims::new(4, "c@example.com", UserRole::Customer);
        assert!(!claims.is_admin());
    }
}
