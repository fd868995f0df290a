//! Admin dashboard handlers

use crate::dto::ApiResponse;
use crate::BookingService;
use actix_web::{web, HttpResponse};
use rentwheels_auth::AdminUser;
use rentwheels_core::traits::VehicleRepository;
use rentwheels_core::AppError;
use rentwheels_db::PgVehicleRepository;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::instrument;

/// Dashboard statistics
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    /// Booking counts keyed by lifecycle status
    pub bookings_by_status: BTreeMap<String, i64>,
    /// Total bookings across all statuses
    pub total_bookings: i64,
    /// Total vehicles in the fleet
    pub total_vehicles: i64,
    /// Vehicles currently open for booking
    pub available_vehicles: i64,
}

/// Booking and fleet statistics (admin)
///
/// GET /api/v1/admin/stats
#[instrument(skip(pool, manager, _admin))]
pub async fn stats(
    pool: web::Data<PgPool>,
    manager: web::Data<BookingService>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let counts = manager.stats().await?;
    let total_bookings = counts.iter().map(|(_, n)| n).sum();
    let bookings_by_status = counts
        .into_iter()
        .map(|(status, n)| (status.to_string(), n))
        .collect();

    let vehicle_repo = PgVehicleRepository::new(pool.get_ref().clone());
    let (_, total_vehicles) = vehicle_repo.list_filtered(false, 1, 0).await?;
    let (_, available_vehicles) = vehicle_repo.list_filtered(true, 1, 0).await?;

    let response = DashboardStats {
        bookings_by_status,
        total_bookings,
        total_vehicles,
        available_vehicles,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Configure dashboard routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin").route("/stats", web::get().to(stats)));
}
