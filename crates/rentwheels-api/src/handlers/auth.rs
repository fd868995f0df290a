//! Authentication handlers
//!
//! HTTP handlers for registration, login and session introspection.

use crate::dto::auth::{AuthResponse, LoginRequest, MeResponse, RegisterRequest};
use crate::dto::ApiResponse;
use actix_web::{cookie::Cookie, web, HttpResponse};
use chrono::{DateTime, Duration, Utc};
use rentwheels_auth::{AuthenticatedUser, JwtService, PasswordService};
use rentwheels_core::models::{User, UserInfo, UserRole};
use rentwheels_core::traits::{Repository, UserRepository};
use rentwheels_core::AppError;
use rentwheels_db::PgUserRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Register a new customer account
///
/// POST /api/v1/auth/register
#[instrument(skip(pool, jwt_service, password_service, req))]
pub async fn register(
    pool: web::Data<PgPool>,
    jwt_service: web::Data<Arc<JwtService>>,
    password_service: web::Data<Arc<PasswordService>>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    debug!(email = %req.email, "Processing registration request");

    let password_hash = password_service.hash_password(&req.password)?;

    let now = Utc::now();
    let new_user = User {
        id: 0, // Assigned by the database
        name: req.name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        mobile: req.mobile.clone(),
        password_hash,
        role: UserRole::Customer,
        active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    };

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let created = user_repo.create(&new_user).await?;

    info!(email = %created.email, id = created.id, "Customer registered");

    let token = jwt_service.create_token_for_user(created.id, &created.email, created.role)?;
    let response = AuthResponse {
        token: token.clone(),
        expires_in: jwt_service.expiration_secs(),
        user: UserInfo::from(&created),
    };

    Ok(HttpResponse::Created()
        .cookie(session_cookie(token, jwt_service.expiration_secs()))
        .json(ApiResponse::with_message(response, "Account created")))
}

/// Login endpoint
///
/// POST /api/v1/auth/login
#[instrument(skip(pool, jwt_service, password_service, req))]
pub async fn login(
    pool: web::Data<PgPool>,
    jwt_service: web::Data<Arc<JwtService>>,
    password_service: web::Data<Arc<PasswordService>>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();

    debug!(email = %email, "Processing login request");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let user = user_repo.find_by_email(&email).await?.ok_or_else(|| {
        info!(email = %email, "Login failed: user not found");
        AppError::InvalidCredentials
    })?;

    if !user.active {
        warn!(email = %email, "Login failed: account is inactive");
        return Err(AppError::InvalidCredentials);
    }

    let password_valid = password_service
        .verify_password(&req.password, &user.password_hash)
        .map_err(|e| {
            error!("Password verification error: {}", e);
            AppError::Internal("Password verification failed".to_string())
        })?;

    if !password_valid {
        info!(email = %email, "Login failed: invalid password");
        return Err(AppError::InvalidCredentials);
    }

    if let Err(e) = user_repo.update_last_login(user.id).await {
        warn!("Failed to update last login for user {}: {}", user.id, e);
    }

    let token = jwt_service.create_token_for_user(user.id, &user.email, user.role)?;
    let expires_in = jwt_service.expiration_secs();

    info!(email = %email, role = ?user.role, "Login successful");

    let response = AuthResponse {
        token: token.clone(),
        expires_in,
        user: UserInfo::from(&user),
    };

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, expires_in))
        .json(ApiResponse::success(response)))
}

/// Logout endpoint
///
/// POST /api/v1/auth/logout
#[instrument(skip(user))]
pub async fn logout(user: AuthenticatedUser) -> HttpResponse {
    info!(email = %user.email, "User logged out");

    // Clear the token cookie
    let cookie = Cookie::build("token", "")
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(0))
        .finish();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(serde_json::json!({"logged_out": true})))
}

/// Get current user info
///
/// GET /api/v1/auth/me
#[instrument(skip(pool, user))]
pub async fn me(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    debug!(email = %user.email, "Getting current user info");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let db_user = user_repo
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound(user.user_id.to_string()))?;

    let token_expires_at: DateTime<Utc> =
        Utc::now() + Duration::seconds(user.claims.exp - Utc::now().timestamp());

    let response = MeResponse {
        user: UserInfo::from(&db_user),
        token_expires_at,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

fn session_cookie(token: String, expires_in: i64) -> Cookie<'static> {
    Cookie::build("token", token)
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(actix_web::cookie::time::Duration::seconds(expires_in))
        .finish()
}

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid_req = LoginRequest {
            email: "admin@example.com".to_string(),
            password: "password".to_string(),
        };
        assert!(valid_req.validate().is_ok());

        let invalid_req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "".to_string(),
        };
        assert!(invalid_req.validate().is_err());
    }
}
