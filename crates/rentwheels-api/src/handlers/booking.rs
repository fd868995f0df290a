//! Booking handlers
//!
//! The application endpoint accepts a multipart form carrying the applicant
//! details and the three identity documents. Documents are persisted first;
//! if the booking is rejected the stored files are cleaned up again.

use crate::dto::booking::{
    BookingQuery, CompleteRentalRequest, CreateBookingForm, ReviewRequest, StartRentalRequest,
};
use crate::dto::ApiResponse;
use crate::BookingService;
use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{web, HttpResponse};
use rentwheels_auth::{AdminUser, AuthenticatedUser};
use rentwheels_core::models::{BookingStatus, DocumentKind};
use rentwheels_core::traits::DocumentStore;
use rentwheels_core::AppError;
use rentwheels_services::booking_manager::DocumentSet;
use rentwheels_services::LocalDocumentStore;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Persist one uploaded document, if present
async fn store_upload(
    store: &LocalDocumentStore,
    kind: DocumentKind,
    file: Option<TempFile>,
) -> Result<Option<String>, AppError> {
    let Some(file) = file else {
        return Ok(None);
    };

    let content_type = file
        .content_type
        .as_ref()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default();
    let original_filename = file.file_name.clone().unwrap_or_else(|| kind.to_string());
    let data = tokio::fs::read(file.file.path()).await?;

    let stored = store
        .store(kind, &original_filename, &content_type, data)
        .await?;
    Ok(Some(stored.url))
}

/// Best-effort removal of already stored documents after a rejected application
async fn discard_documents(store: &LocalDocumentStore, documents: &DocumentSet) {
    for url in [
        documents.driving_license.as_deref(),
        documents.id_card.as_deref(),
        documents.live_photo.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        if let Err(e) = store.remove(url).await {
            warn!(url, error = %e, "Failed to discard stored document");
        }
    }
}

/// Submit a booking application
///
/// POST /api/v1/bookings
#[instrument(skip(manager, store, form), fields(customer_id = user.user_id))]
pub async fn create(
    manager: web::Data<BookingService>,
    store: web::Data<LocalDocumentStore>,
    user: AuthenticatedUser,
    form: MultipartForm<CreateBookingForm>,
) -> Result<HttpResponse, AppError> {
    let mut form = form.into_inner();
    let driving_license = form.driving_license.take();
    let id_card = form.id_card.take();
    let live_photo = form.live_photo.take();

    let input = form.into_application()?;

    let documents = DocumentSet {
        driving_license: store_upload(&store, DocumentKind::DrivingLicense, driving_license)
            .await?,
        id_card: store_upload(&store, DocumentKind::IdCard, id_card).await?,
        live_photo: store_upload(&store, DocumentKind::LivePhoto, live_photo).await?,
    };

    match manager.create_booking(user.user_id, input, documents.clone()).await {
        Ok(booking) => {
            info!(booking_id = %booking.id, customer_id = user.user_id, "Booking submitted");
            Ok(HttpResponse::Created()
                .json(ApiResponse::with_message(booking, "Booking submitted for review")))
        }
        Err(e) => {
            discard_documents(&store, &documents).await;
            Err(e)
        }
    }
}

/// List the caller's bookings
///
/// GET /api/v1/bookings/mine
#[instrument(skip(manager))]
pub async fn mine(
    manager: web::Data<BookingService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let bookings = manager.my_bookings(user.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(bookings)))
}

/// Get a single booking
///
/// GET /api/v1/bookings/{id}
#[instrument(skip(manager))]
pub async fn get(
    manager: web::Data<BookingService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let booking = manager
        .get_booking(path.into_inner(), user.user_id, user.is_admin())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(booking)))
}

/// List bookings with an optional status filter (admin)
///
/// GET /api/v1/bookings
#[instrument(skip(manager, _admin))]
pub async fn list(
    manager: web::Data<BookingService>,
    _admin: AdminUser,
    query: web::Query<BookingQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    query.pagination.validate()?;

    let status = query
        .status
        .as_deref()
        .map(|s| {
            BookingStatus::from_str(s).ok_or_else(|| {
                AppError::validation_field("status", format!("Unknown booking status '{}'", s))
            })
        })
        .transpose()?;

    let (bookings, total) = manager
        .list_bookings(status, query.pagination.limit(), query.pagination.offset())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(query.pagination.paginate(bookings, total))))
}

/// Accept or decline a pending booking (admin)
///
/// POST /api/v1/bookings/{id}/review
#[instrument(skip(manager, admin, req))]
pub async fn review(
    manager: web::Data<BookingService>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let req = req.into_inner();

    let booking = manager.review(id, req.action, req.admin_notes).await?;

    info!(booking_id = %id, action = %req.action, admin = %admin.email, "Booking reviewed");

    Ok(HttpResponse::Ok().json(ApiResponse::success(booking)))
}

/// Record the vehicle handover and start the rental (admin)
///
/// POST /api/v1/bookings/{id}/start
#[instrument(skip(manager, admin, req))]
pub async fn start(
    manager: web::Data<BookingService>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<StartRentalRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let req = req.into_inner();

    let booking = manager
        .start_rental(id, req.vehicle_name, req.vehicle_number, req.start_odometer)
        .await?;

    info!(booking_id = %id, admin = %admin.email, "Rental started");

    Ok(HttpResponse::Ok().json(ApiResponse::success(booking)))
}

/// Record the vehicle return and complete the rental (admin)
///
/// POST /api/v1/bookings/{id}/complete
#[instrument(skip(manager, admin, req))]
pub async fn complete(
    manager: web::Data<BookingService>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<CompleteRentalRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let req = req.into_inner();

    let booking = manager
        .complete_rental(id, req.end_odometer, req.actual_return_time)
        .await?;

    info!(
        booking_id = %id,
        late_hours = booking.late_hours.unwrap_or(0),
        admin = %admin.email,
        "Rental completed"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(booking)))
}

/// Cancel a booking
///
/// POST /api/v1/bookings/{id}/cancel
#[instrument(skip(manager))]
pub async fn cancel(
    manager: web::Data<BookingService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let booking = manager.cancel(id, user.user_id, user.is_admin()).await?;

    info!(booking_id = %id, customer_id = user.user_id, "Booking cancelled");

    Ok(HttpResponse::Ok().json(ApiResponse::success(booking)))
}

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(create))
            .route("", web::get().to(list))
            .route("/mine", web::get().to(mine))
            .route("/{id}", web::get().to(get))
            .route("/{id}/review", web::put().to(review))
            .route("/{id}/start", web::put().to(start))
            .route("/{id}/complete", web::put().to(complete))
            .route("/{id}/cancel", web::put().to(cancel)),
    );
}
