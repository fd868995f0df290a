//! Booking repository implementation
//!
//! Status transitions are compare-and-set: every transition UPDATE carries
//! `AND status = <expected>` in its WHERE clause and returns the updated row,
//! or `None` when another request moved the booking first. This keeps
//! concurrent admin actions from double-applying without explicit locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rentwheels_core::{
    models::{
        Booking, BookingStatus, DepositType, GuardianRelation, PaymentStatus,
    },
    traits::{BookingRepository, HandoverUpdate, Repository, ReturnUpdate, ReviewUpdate},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

const BOOKING_COLUMNS: &str = "id, vehicle_id, customer_id, status, payment_status, \
     start_time, duration_hours, end_time, total_price, deposit_amount, \
     full_name, guardian_name, guardian_relation, residential_address, email, mobile, \
     occupation, reference1_name, reference1_mobile, reference2_name, reference2_mobile, \
     license_number, license_expiry, deposit_type, bike_details, with_driver, \
     home_delivery, delivery_address, delivery_distance_km, \
     driving_license_url, id_card_url, live_photo_url, \
     gateway_order_id, gateway_payment_id, admin_notes, \
     assigned_vehicle_name, assigned_vehicle_number, start_odometer, \
     end_odometer, actual_return_time, late_hours, late_fee, \
     created_at, updated_at";

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Booking, Uuid> for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking {}: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            "SELECT {} FROM bookings ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            BOOKING_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding bookings: {}", e);
            AppError::Database(format!("Failed to fetch bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting bookings: {}", e);
                AppError::Database(format!("Failed to count bookings: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Booking) -> AppResult<Booking> {
        debug!("Creating booking {} for vehicle {}", entity.id, entity.vehicle_id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (
                id, vehicle_id, customer_id, status, payment_status,
                start_time, duration_hours, end_time, total_price, deposit_amount,
                full_name, guardian_name, guardian_relation, residential_address,
                email, mobile, occupation,
                reference1_name, reference1_mobile, reference2_name, reference2_mobile,
                license_number, license_expiry, deposit_type, bike_details, with_driver,
                home_delivery, delivery_address, delivery_distance_km,
                driving_license_url, id_card_url, live_photo_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21,
                    $22, $23, $24, $25, $26,
                    $27, $28, $29, $30, $31, $32)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(entity.id)
        .bind(entity.vehicle_id)
        .bind(entity.customer_id)
        .bind(entity.status.to_string())
        .bind(entity.payment_status.to_string())
        .bind(entity.start_time)
        .bind(entity.duration_hours)
        .bind(entity.end_time)
        .bind(entity.total_price)
        .bind(entity.deposit_amount)
        .bind(&entity.full_name)
        .bind(&entity.guardian_name)
        .bind(entity.guardian_relation.to_string())
        .bind(&entity.residential_address)
        .bind(&entity.email)
        .bind(&entity.mobile)
        .bind(&entity.occupation)
        .bind(&entity.reference1_name)
        .bind(&entity.reference1_mobile)
        .bind(&entity.reference2_name)
        .bind(&entity.reference2_mobile)
        .bind(&entity.license_number)
        .bind(entity.license_expiry)
        .bind(entity.deposit_type.to_string())
        .bind(&entity.bike_details)
        .bind(entity.with_driver)
        .bind(entity.home_delivery)
        .bind(&entity.delivery_address)
        .bind(entity.delivery_distance_km)
        .bind(&entity.driving_license_url)
        .bind(&entity.id_card_url)
        .bind(&entity.live_photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating booking: {}", e);
            AppError::Database(format!("Failed to create booking: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Booking) -> AppResult<Booking> {
        debug!("Updating booking: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $2,
                payment_status = $3,
                gateway_order_id = $4,
                gateway_payment_id = $5,
                admin_notes = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(entity.id)
        .bind(entity.status.to_string())
        .bind(entity.payment_status.to_string())
        .bind(&entity.gateway_order_id)
        .bind(&entity.gateway_payment_id)
        .bind(&entity.admin_notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating booking {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update booking: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting booking {}: {}", id, e);
                AppError::Database(format!("Failed to delete booking: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_customer(&self, customer_id: i32) -> AppResult<Vec<Booking>> {
        debug!("Finding bookings for customer: {}", customer_id);

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE customer_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding customer bookings: {}", e);
            AppError::Database(format!("Failed to fetch bookings: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        debug!("Listing bookings, status filter: {:?}", status);

        let (rows, total) = match status {
            Some(status) => {
                let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
                    "SELECT {} FROM bookings WHERE status = $1 \
                     ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                    BOOKING_COLUMNS
                ))
                .bind(status.to_string())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await;

                let total: Result<(i64,), _> =
                    sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE status = $1")
                        .bind(status.to_string())
                        .fetch_one(&self.pool)
                        .await;

                (rows, total)
            }
            None => {
                let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
                    "SELECT {} FROM bookings ORDER BY created_at DESC LIMIT $1 OFFSET $2",
                    BOOKING_COLUMNS
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await;

                let total: Result<(i64,), _> = sqlx::query_as("SELECT COUNT(*) FROM bookings")
                    .fetch_one(&self.pool)
                    .await;

                (rows, total)
            }
        };

        let rows = rows.map_err(|e| {
            error!("Database error listing bookings: {}", e);
            AppError::Database(format!("Failed to list bookings: {}", e))
        })?;
        let total = total.map_err(|e| {
            error!("Database error counting bookings: {}", e);
            AppError::Database(format!("Failed to count bookings: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> AppResult<Vec<(BookingStatus, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM bookings GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting bookings by status: {}", e);
                    AppError::Database(format!("Failed to count bookings: {}", e))
                })?;

        Ok(rows
            .into_iter()
            .filter_map(|(status, count)| BookingStatus::from_str(&status).map(|s| (s, count)))
            .collect())
    }

    #[instrument(skip(self, update))]
    async fn apply_review(
        &self,
        id: Uuid,
        expected: BookingStatus,
        update: ReviewUpdate,
    ) -> AppResult<Option<Booking>> {
        debug!("Reviewing booking {} -> {}", id, update.new_status);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $3,
                admin_notes = $4,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(expected.to_string())
        .bind(update.new_status.to_string())
        .bind(&update.admin_notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error reviewing booking {}: {}", id, e);
            AppError::Database(format!("Failed to review booking: {}", e))
        })?;

        if row.is_none() {
            warn!("Review of booking {} lost the status race", id);
        }

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn attach_order(
        &self,
        id: Uuid,
        expected: BookingStatus,
        order_id: &str,
    ) -> AppResult<Option<Booking>> {
        debug!("Attaching order {} to booking {}", order_id, id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = 'payment_pending',
                gateway_order_id = $3,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(expected.to_string())
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error attaching order to booking {}: {}", id, e);
            AppError::Database(format!("Failed to attach order: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn record_payment(
        &self,
        id: Uuid,
        expected: BookingStatus,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> AppResult<Option<Booking>> {
        debug!("Recording payment {} for booking {}", payment_id, id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = 'paid',
                payment_status = $3,
                gateway_payment_id = $4,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(expected.to_string())
        .bind(payment_status.to_string())
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error recording payment for booking {}: {}", id, e);
            AppError::Database(format!("Failed to record payment: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, update))]
    async fn start_rental(
        &self,
        id: Uuid,
        expected: BookingStatus,
        update: HandoverUpdate,
    ) -> AppResult<Option<Booking>> {
        debug!("Starting rental for booking {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = 'active',
                assigned_vehicle_name = $3,
                assigned_vehicle_number = $4,
                start_odometer = $5,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(expected.to_string())
        .bind(&update.vehicle_name)
        .bind(&update.vehicle_number)
        .bind(update.start_odometer)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error starting rental for booking {}: {}", id, e);
            AppError::Database(format!("Failed to start rental: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, update))]
    async fn complete_rental(
        &self,
        id: Uuid,
        expected: BookingStatus,
        update: ReturnUpdate,
    ) -> AppResult<Option<Booking>> {
        debug!("Completing rental for booking {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = 'completed',
                end_odometer = $3,
                actual_return_time = $4,
                late_hours = $5,
                late_fee = $6,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(expected.to_string())
        .bind(update.end_odometer)
        .bind(update.actual_return_time)
        .bind(update.late_hours)
        .bind(update.late_fee)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error completing rental for booking {}: {}", id, e);
            AppError::Database(format!("Failed to complete rental: {}", e))
        })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn cancel(&self, id: Uuid, expected: BookingStatus) -> AppResult<Option<Booking>> {
        debug!("Cancelling booking {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = 'cancelled',
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(expected.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error cancelling booking {}: {}", id, e);
            AppError::Database(format!("Failed to cancel booking: {}", e))
        })?;

        Ok(row.map(Into::into))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    vehicle_id: Uuid,
    customer_id: i32,
    status: String,
    payment_status: String,
    start_time: DateTime<Utc>,
    duration_hours: i32,
    end_time: DateTime<Utc>,
    total_price: Decimal,
    deposit_amount: Decimal,
    full_name: String,
    guardian_name: String,
    guardian_relation: String,
    residential_address: String,
    email: String,
    mobile: String,
    occupation: String,
    reference1_name: String,
    reference1_mobile: String,
    reference2_name: String,
    reference2_mobile: String,
    license_number: String,
    license_expiry: DateTime<Utc>,
    deposit_type: String,
    bike_details: Option<String>,
    with_driver: bool,
    home_delivery: bool,
    delivery_address: Option<String>,
    delivery_distance_km: i32,
    driving_license_url: String,
    id_card_url: String,
    live_photo_url: String,
    gateway_order_id: Option<String>,
    gateway_payment_id: Option<String>,
    admin_notes: Option<String>,
    assigned_vehicle_name: Option<String>,
    assigned_vehicle_number: Option<String>,
    start_odometer: Option<i32>,
    end_odometer: Option<i32>,
    actual_return_time: Option<DateTime<Utc>>,
    late_hours: Option<i32>,
    late_fee: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            customer_id: row.customer_id,
            status: BookingStatus::from_str(&row.status).unwrap_or_default(),
            payment_status: PaymentStatus::from_str(&row.payment_status).unwrap_or_default(),
            start_time: row.start_time,
            duration_hours: row.duration_hours,
            end_time: row.end_time,
            total_price: row.total_price,
            deposit_amount: row.deposit_amount,
            full_name: row.full_name,
            guardian_name: row.guardian_name,
            guardian_relation: GuardianRelation::from_str(&row.guardian_relation)
                .unwrap_or_default(),
            residential_address: row.residential_address,
            email: row.email,
            mobile: row.mobile,
            occupation: row.occupation,
            reference1_name: row.reference1_name,
            reference1_mobile: row.reference1_mobile,
            reference2_name: row.reference2_name,
            reference2_mobile: row.reference2_mobile,
            license_number: row.license_number,
            license_expiry: row.license_expiry,
            deposit_type: DepositType::from_str(&row.deposit_type).unwrap_or_default(),
            bike_details: row.bike_details,
            with_driver: row.with_driver,
            home_delivery: row.home_delivery,
            delivery_address: row.delivery_address,
            delivery_distance_km: row.delivery_distance_km,
            driving_license_url: row.driving_license_url,
            id_card_url: row.id_card_url,
            live_photo_url: row.live_photo_url,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            admin_notes: row.admin_notes,
            assigned_vehicle_name: row.assigned_vehicle_name,
            assigned_vehicle_number: row.assigned_vehicle_number,
            start_odometer: row.start_odometer,
            end_odometer: row.end_odometer,
            actual_return_time: row.actual_return_time,
            late_hours: row.late_hours,
            late_fee: row.late_fee,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
