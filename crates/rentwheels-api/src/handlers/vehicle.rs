//! Fleet handlers
//!
//! Public listing plus admin CRUD for the vehicle fleet.

use crate::dto::vehicle::{
    AvailabilityRequest, CreateVehicleRequest, UpdateVehicleRequest, VehicleQuery,
};
use crate::dto::{ApiResponse, PaginationParams};
use actix_web::{web, HttpResponse};
use rentwheels_auth::{AdminUser, AuthenticatedUser};
use rentwheels_core::traits::{Repository, VehicleRepository};
use rentwheels_core::AppError;
use rentwheels_db::PgVehicleRepository;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

/// List vehicles
///
/// GET /api/v1/vehicles
///
/// Non-admin callers only ever see vehicles open for booking; admins can
/// request the full fleet with `available_only=false`.
#[instrument(skip(pool, user))]
pub async fn list(
    pool: web::Data<PgPool>,
    user: Option<AuthenticatedUser>,
    query: web::Query<VehicleQuery>,
    pagination: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    pagination.validate()?;

    let is_admin = user.map(|u| u.is_admin()).unwrap_or(false);
    let available_only = if is_admin { query.available_only } else { true };

    let repo = PgVehicleRepository::new(pool.get_ref().clone());
    let (vehicles, total) = repo
        .list_filtered(available_only, pagination.limit(), pagination.offset())
        .await?;

    debug!(total, available_only, "Listed vehicles");

    Ok(HttpResponse::Ok().json(ApiResponse::success(pagination.paginate(vehicles, total))))
}

/// Get a single vehicle
///
/// GET /api/v1/vehicles/{id}
#[instrument(skip(pool))]
pub async fn get(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgVehicleRepository::new(pool.get_ref().clone());
    let vehicle = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::VehicleNotFound(id.to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(vehicle)))
}

/// Add a vehicle to the fleet (admin)
///
/// POST /api/v1/vehicles
#[instrument(skip(pool, admin, req))]
pub async fn create(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    req: web::Json<CreateVehicleRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    let vehicle = req.into_inner().into_vehicle();
    vehicle.validate().map_err(AppError::InvalidInput)?;

    let repo = PgVehicleRepository::new(pool.get_ref().clone());
    let created = repo.create(&vehicle).await?;

    info!(id = %created.id, name = %created.name, admin = %admin.email, "Vehicle created");

    Ok(HttpResponse::Created().json(ApiResponse::with_message(created, "Vehicle created")))
}

/// Update a vehicle (admin)
///
/// PUT /api/v1/vehicles/{id}
#[instrument(skip(pool, admin, req))]
pub async fn update(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateVehicleRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgVehicleRepository::new(pool.get_ref().clone());
    let mut vehicle = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::VehicleNotFound(id.to_string()))?;

    req.into_inner().apply(&mut vehicle);
    vehicle.validate().map_err(AppError::InvalidInput)?;

    let updated = repo.update(&vehicle).await?;

    info!(id = %id, admin = %admin.email, "Vehicle updated");

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// Remove a vehicle from the fleet (admin)
///
/// DELETE /api/v1/vehicles/{id}
#[instrument(skip(pool, admin))]
pub async fn delete(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgVehicleRepository::new(pool.get_ref().clone());
    if !repo.delete(id).await? {
        return Err(AppError::VehicleNotFound(id.to_string()));
    }

    info!(id = %id, admin = %admin.email, "Vehicle deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// Toggle availability (admin)
///
/// PATCH /api/v1/vehicles/{id}/availability
#[instrument(skip(pool, admin, req))]
pub async fn set_availability(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<AvailabilityRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let repo = PgVehicleRepository::new(pool.get_ref().clone());
    if !repo.set_available(id, req.available).await? {
        return Err(AppError::VehicleNotFound(id.to_string()));
    }

    info!(id = %id, available = req.available, admin = %admin.email, "Vehicle availability changed");

    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "id": id,
        "available": req.available,
    }))))
}

/// Configure vehicle routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vehicles")
            .route("", web::get().to(list))
            .route("", web::post().to(create))
            .route("/{id}", web::get().to(get))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete))
            .route("/{id}/availability", web::patch().to(set_availability)),
    );
}
