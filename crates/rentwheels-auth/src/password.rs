//! Argon2id password hashing

use argon2::{
    password_hash::{Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use rentwheels_core::error::AppError;
use tracing::error;

/// Hashes and verifies customer passwords
///
/// Hashes are stored in PHC string format, so the parameters travel with
/// the hash and can be tightened later without invalidating old accounts.
#[derive(Debug, Clone, Default)]
pub struct PasswordService {
    hasher: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "Password hashing failed");
                AppError::PasswordHash(format!("Failed to hash password: {}", e))
            })?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored PHC hash
    ///
    /// A wrong password is `Ok(false)`; only a malformed hash or an
    /// internal hasher failure is an error.
    pub fn verify_password(&self, password: &str, stored: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(stored).map_err(|e| {
            error!(error = %e, "Stored password hash is not valid PHC");
            AppError::PasswordHash(format!("Invalid password hash: {}", e))
        })?;

        match self.hasher.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, "Password verification failed");
                Err(AppError::PasswordHash(format!(
                    "Failed to verify password: {}",
                    e
                )))
            }
        }
    }
}
