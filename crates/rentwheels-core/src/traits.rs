//! Common traits for repositories and external collaborators
//!
//! Defines abstractions for database access, document storage and the
//! payment gateway. Status transitions on bookings are compare-and-set:
//! the repository applies the update only if the booking is still in the
//! expected status, and returns `None` when it no longer is. Callers turn
//! that `None` into an invalid-transition error.

use crate::error::AppError;
use crate::models::{
    Booking, BookingStatus, DocumentKind, PaymentStatus, User, Vehicle,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;

    /// Delete entity by ID
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// Vehicle repository trait with specialized methods
#[async_trait]
pub trait VehicleRepository: Repository<Vehicle, Uuid> {
    /// List vehicles, optionally restricted to bookable ones
    async fn list_filtered(
        &self,
        available_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Vehicle>, i64), AppError>;

    /// Flip availability
    async fn set_available(&self, id: Uuid, available: bool) -> Result<bool, AppError>;
}

/// Fields recorded when an admin reviews a booking
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub new_status: BookingStatus,
    pub admin_notes: Option<String>,
}

/// Fields recorded at vehicle handover
#[derive(Debug, Clone)]
pub struct HandoverUpdate {
    pub vehicle_name: String,
    pub vehicle_number: String,
    pub start_odometer: i32,
}

/// Fields recorded at vehicle return
#[derive(Debug, Clone)]
pub struct ReturnUpdate {
    pub end_odometer: i32,
    pub actual_return_time: DateTime<Utc>,
    pub late_hours: i32,
    pub late_fee: Decimal,
}

/// Booking repository trait
///
/// Every transition method takes the status the booking is expected to be
/// in and returns `Ok(None)` when the row was not in that status anymore,
/// so concurrent admin actions cannot double-apply.
#[async_trait]
pub trait BookingRepository: Repository<Booking, Uuid> {
    /// Bookings owned by a customer, newest first
    async fn find_by_customer(&self, customer_id: i32) -> Result<Vec<Booking>, AppError>;

    /// Admin listing with optional status filter
    async fn list_filtered(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, i64), AppError>;

    /// Booking counts per status, for the dashboard
    async fn count_by_status(&self) -> Result<Vec<(BookingStatus, i64)>, AppError>;

    /// Apply an admin review verdict to a pending booking
    async fn apply_review(
        &self,
        id: Uuid,
        expected: BookingStatus,
        update: ReviewUpdate,
    ) -> Result<Option<Booking>, AppError>;

    /// Attach a gateway order and move to payment_pending
    async fn attach_order(
        &self,
        id: Uuid,
        expected: BookingStatus,
        order_id: &str,
    ) -> Result<Option<Booking>, AppError>;

    /// Record a verified payment and move to paid
    async fn record_payment(
        &self,
        id: Uuid,
        expected: BookingStatus,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<Option<Booking>, AppError>;

    /// Record handover details and move to active
    async fn start_rental(
        &self,
        id: Uuid,
        expected: BookingStatus,
        update: HandoverUpdate,
    ) -> Result<Option<Booking>, AppError>;

    /// Record return details and move to completed
    async fn complete_rental(
        &self,
        id: Uuid,
        expected: BookingStatus,
        update: ReturnUpdate,
    ) -> Result<Option<Booking>, AppError>;

    /// Cancel a booking still in the expected status
    async fn cancel(
        &self,
        id: Uuid,
        expected: BookingStatus,
    ) -> Result<Option<Booking>, AppError>;
}

/// User repository trait with specialized methods
#[async_trait]
pub trait UserRepository: Repository<User, i32> {
    /// Find user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Update last login timestamp
    async fn update_last_login(&self, id: i32) -> Result<(), AppError>;
}

/// A stored document, addressable by its public URL
#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    pub kind: DocumentKind,
    pub url: String,
}

/// Document storage abstraction
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist an uploaded document and return its public URL
    async fn store(
        &self,
        kind: DocumentKind,
        original_filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredDocument, AppError>;

    /// Remove a stored document by its public URL
    async fn remove(&self, url: &str) -> Result<(), AppError>;
}

/// Order created at the payment gateway
#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrder {
    /// Gateway-assigned order id
    pub order_id: String,
    /// Amount in the currency's minor unit (paise)
    pub amount_minor: i64,
    /// ISO currency code
    pub currency: String,
}

/// Payment gateway abstraction
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for the given major-unit amount
    async fn create_order(
        &self,
        amount: Decimal,
        receipt: &str,
    ) -> Result<GatewayOrder, AppError>;

    /// Check the gateway's callback signature over an order and payment id
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
