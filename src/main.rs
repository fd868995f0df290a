//! RentWheels Backend Server
//!
//! Self-drive car rental backend: fleet management, booking applications
//! with document upload, admin review, Razorpay checkout and rental
//! handover/return tracking.

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use rentwheels_api::{
    configure_auth, configure_bookings, configure_dashboard, configure_payments,
    configure_vehicles, BookingService, PaymentService,
};
use rentwheels_auth::{JwtService, PasswordService};
use rentwheels_core::AppConfig;
use rentwheels_db::{create_pool, run_migrations, PgBookingRepository, PgVehicleRepository};
use rentwheels_services::{BookingManager, LocalDocumentStore, PaymentManager, RazorpayClient};
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "rentwheels",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Configure API routes
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .route("/health", web::get().to(health_check))
            // Auth endpoints
            .configure(configure_auth)
            // Fleet endpoints
            .configure(configure_vehicles)
            // Booking lifecycle endpoints
            .configure(configure_bookings)
            // Checkout endpoints
            .configure(configure_payments)
            // Admin dashboard
            .configure(configure_dashboard),
    );
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "rentwheels={},rentwheels_api={},rentwheels_services={},rentwheels_db={},actix_web=info,sqlx=warn",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!("Starting RentWheels backend v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    info!("Connecting to database...");
    let pool = create_pool(
        &config.database.url,
        Some(config.database.max_connections),
    )
    .await
    .unwrap_or_else(|e| {
        eprintln!("Failed to create database pool: {}", e);
        std::process::exit(1);
    });

    run_migrations(&pool).await.unwrap_or_else(|e| {
        eprintln!("Failed to run migrations: {}", e);
        std::process::exit(1);
    });

    info!(
        "Database ready with {} max connections",
        config.database.max_connections
    );

    // Auth services
    let jwt_service = Arc::new(JwtService::new(
        &config.auth.jwt_secret,
        config.auth.jwt_expiration_minutes * 60,
    ));
    let password_service = Arc::new(PasswordService::new());

    // Repositories shared by the managers
    let booking_repo = Arc::new(PgBookingRepository::new(pool.clone()));
    let vehicle_repo = Arc::new(PgVehicleRepository::new(pool.clone()));

    // Business services
    let gateway = Arc::new(RazorpayClient::new(&config.payment));
    let booking_service: BookingService = BookingManager::new(
        booking_repo.clone(),
        vehicle_repo.clone(),
        config.booking.clone(),
    );
    let payment_service: PaymentService =
        PaymentManager::new(booking_repo.clone(), gateway.clone());
    let document_store = LocalDocumentStore::new(&config.storage);

    let booking_service = web::Data::new(booking_service);
    let payment_service = web::Data::new(payment_service);
    let document_store = web::Data::new(document_store);

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    let cors_origin = config.server.cors_origin.clone();
    let upload_dir = config.storage.upload_dir.clone();
    let public_base = config
        .storage
        .public_base_url
        .trim_end_matches('/')
        .to_string();
    let max_payload = config.storage.max_upload_bytes * 4;

    // Clone services for closure
    let jwt_service_clone = jwt_service.clone();
    let password_service_clone = password_service.clone();

    // Create and run server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::COOKIE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            // Add database pool to app data
            .app_data(web::Data::new(pool.clone()))
            // Auth services
            .app_data(web::Data::new(jwt_service_clone.clone()))
            .app_data(web::Data::new(password_service_clone.clone()))
            // Business services
            .app_data(booking_service.clone())
            .app_data(payment_service.clone())
            .app_data(document_store.clone())
            .app_data(web::Data::new(gateway.clone()))
            // Multipart uploads carry three documents plus the form fields
            .app_data(web::PayloadConfig::new(max_payload))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_query",
                        "message": error_message
                    })),
                )
                .into()
            }))
            // Middleware
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            // Configure routes
            .configure(configure_routes)
            // Stored documents are served statically
            .service(Files::new(&public_base, &upload_dir))
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
