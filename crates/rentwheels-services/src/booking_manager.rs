//! Booking lifecycle management
//!
//! `BookingManager` owns the booking state machine. Every transition is
//! guarded twice: once against the freshly loaded booking, and once by the
//! repository's compare-and-set update. A lost race surfaces as the same
//! invalid-transition error the guard would have produced.

use chrono::{DateTime, Utc};
use rentwheels_core::{
    config::BookingConfig,
    models::{Booking, BookingStatus, NewBooking, ReviewAction, Vehicle},
    pricing,
    traits::{BookingRepository, HandoverUpdate, ReturnUpdate, ReviewUpdate, VehicleRepository},
    validation, AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// URLs of the stored identity documents attached to an application
///
/// All three are required; `missing()` names the absent ones for the
/// documents-missing error.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    pub driving_license: Option<String>,
    pub id_card: Option<String>,
    pub live_photo: Option<String>,
}

impl DocumentSet {
    /// Names of the required documents that are absent
    pub fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.driving_license.is_none() {
            missing.push("driving_license".to_string());
        }
        if self.id_card.is_none() {
            missing.push("id_card".to_string());
        }
        if self.live_photo.is_none() {
            missing.push("live_photo".to_string());
        }
        missing
    }
}

/// Booking lifecycle service
pub struct BookingManager<B: BookingRepository, V: VehicleRepository> {
    booking_repo: Arc<B>,
    vehicle_repo: Arc<V>,
    config: BookingConfig,
}

impl<B: BookingRepository, V: VehicleRepository> BookingManager<B, V> {
    /// Create a new booking manager
    pub fn new(booking_repo: Arc<B>, vehicle_repo: Arc<V>, config: BookingConfig) -> Self {
        Self {
            booking_repo,
            vehicle_repo,
            config,
        }
    }

    async fn load_booking(&self, id: Uuid) -> AppResult<Booking> {
        self.booking_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))
    }

    async fn load_vehicle(&self, id: Uuid) -> AppResult<Vehicle> {
        self.vehicle_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::VehicleNotFound(id.to_string()))
    }

    /// Report the booking's current status after a failed guard or a lost
    /// compare-and-set race.
    async fn transition_failed(&self, id: Uuid, action: &str) -> AppError {
        match self.booking_repo.find_by_id(id).await {
            Ok(Some(current)) => AppError::invalid_transition(current.status, action),
            Ok(None) => AppError::BookingNotFound(id.to_string()),
            Err(e) => e,
        }
    }

    /// Create a new booking from a validated application
    ///
    /// Validates the applicant fields, checks the three required documents,
    /// prices the rental and snapshots both the total price and the
    /// vehicle's deposit onto the new booking.
    #[instrument(skip(self, input, documents), fields(vehicle_id = %input.vehicle_id))]
    pub async fn create_booking(
        &self,
        customer_id: i32,
        input: NewBooking,
        documents: DocumentSet,
    ) -> AppResult<Booking> {
        pricing::validate_duration(input.duration_hours)?;
        if input.duration_hours > self.config.max_duration_hours {
            return Err(AppError::InvalidDuration(input.duration_hours));
        }

        validation::validate_application(&input, self.config.max_delivery_distance_km)?;

        let missing = documents.missing();
        if !missing.is_empty() {
            debug!("Booking application missing documents: {:?}", missing);
            return Err(AppError::DocumentsMissing(missing));
        }

        let vehicle = self.load_vehicle(input.vehicle_id).await?;
        if !vehicle.available {
            return Err(AppError::VehicleUnavailable(vehicle.name.clone()));
        }

        let total_price = pricing::quote(&vehicle, input.duration_hours, input.with_driver)?;
        let deposit = vehicle.effective_deposit();

        // missing() returned empty, so all three URLs are present
        let booking = Booking::from_application(
            customer_id,
            input,
            total_price,
            deposit,
            documents.driving_license.unwrap_or_default(),
            documents.id_card.unwrap_or_default(),
            documents.live_photo.unwrap_or_default(),
        );

        let created = self.booking_repo.create(&booking).await?;

        info!(
            booking_id = %created.id,
            customer_id,
            total_price = %created.total_price,
            "Booking created"
        );

        Ok(created)
    }

    /// Fetch a booking, enforcing ownership for non-admin requesters
    pub async fn get_booking(
        &self,
        id: Uuid,
        requester_id: i32,
        is_admin: bool,
    ) -> AppResult<Booking> {
        let booking = self.load_booking(id).await?;

        if !is_admin && booking.customer_id != requester_id {
            // Hide other customers' bookings entirely
            return Err(AppError::BookingNotFound(id.to_string()));
        }

        Ok(booking)
    }

    /// All bookings belonging to a customer, newest first
    pub async fn my_bookings(&self, customer_id: i32) -> AppResult<Vec<Booking>> {
        self.booking_repo.find_by_customer(customer_id).await
    }

    /// Admin listing with optional status filter
    pub async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        self.booking_repo.list_filtered(status, limit, offset).await
    }

    /// Booking counts per status
    pub async fn stats(&self) -> AppResult<Vec<(BookingStatus, i64)>> {
        self.booking_repo.count_by_status().await
    }

    /// Apply an admin review verdict to a pending booking
    #[instrument(skip(self))]
    pub async fn review(
        &self,
        id: Uuid,
        action: ReviewAction,
        admin_notes: Option<String>,
    ) -> AppResult<Booking> {
        let booking = self.load_booking(id).await?;

        if !booking.status.can_review() {
            return Err(AppError::invalid_transition(booking.status, "review"));
        }

        let new_status = match action {
            ReviewAction::Accept => BookingStatus::Accepted,
            ReviewAction::Decline => BookingStatus::Declined,
        };

        let update = ReviewUpdate {
            new_status,
            admin_notes,
        };

        let updated = self
            .booking_repo
            .apply_review(id, BookingStatus::Pending, update)
            .await?;

        match updated {
            Some(booking) => {
                info!(booking_id = %id, status = %booking.status, "Booking reviewed");
                Ok(booking)
            }
            None => Err(self.transition_failed(id, "review").await),
        }
    }

    /// Record handover details and start the rental
    #[instrument(skip(self))]
    pub async fn start_rental(
        &self,
        id: Uuid,
        vehicle_name: String,
        vehicle_number: String,
        start_odometer: i32,
    ) -> AppResult<Booking> {
        let booking = self.load_booking(id).await?;

        if !booking.status.can_start() {
            return Err(AppError::invalid_transition(booking.status, "start"));
        }

        if vehicle_name.trim().is_empty() {
            return Err(AppError::validation_field(
                "vehicleName",
                "Assigned vehicle name is required",
            ));
        }
        if vehicle_number.trim().is_empty() {
            return Err(AppError::validation_field(
                "vehicleNumber",
                "Assigned vehicle number is required",
            ));
        }
        if start_odometer < 0 {
            return Err(AppError::validation_field(
                "startOdometer",
                "Odometer reading cannot be negative",
            ));
        }

        let update = HandoverUpdate {
            vehicle_name,
            vehicle_number,
            start_odometer,
        };

        let updated = self
            .booking_repo
            .start_rental(id, BookingStatus::Paid, update)
            .await?;

        match updated {
            Some(booking) => {
                info!(booking_id = %id, "Rental started");
                Ok(booking)
            }
            None => Err(self.transition_failed(id, "start").await),
        }
    }

    /// Record the vehicle return and complete the rental
    ///
    /// Late returns are billed in 12-hour blocks at the vehicle's 12-hour
    /// rate; the computed hours and fee are stored on the booking.
    #[instrument(skip(self))]
    pub async fn complete_rental(
        &self,
        id: Uuid,
        end_odometer: i32,
        actual_return_time: Option<DateTime<Utc>>,
    ) -> AppResult<Booking> {
        let booking = self.load_booking(id).await?;

        if !booking.status.can_complete() {
            return Err(AppError::invalid_transition(booking.status, "complete"));
        }

        if let Some(start) = booking.start_odometer {
            if end_odometer < start {
                return Err(AppError::validation_field(
                    "endOdometer",
                    "End odometer cannot be below the start reading",
                ));
            }
        }

        let returned_at = actual_return_time.unwrap_or_else(Utc::now);
        let late_hours = booking.late_hours_at(returned_at);

        let vehicle = self.load_vehicle(booking.vehicle_id).await?;
        let late_fee = pricing::late_charges(&vehicle.pricing, late_hours);

        if late_hours > 0 {
            warn!(
                booking_id = %id,
                late_hours,
                late_fee = %late_fee,
                "Vehicle returned late"
            );
        }

        let update = ReturnUpdate {
            end_odometer,
            actual_return_time: returned_at,
            late_hours,
            late_fee,
        };

        let updated = self
            .booking_repo
            .complete_rental(id, BookingStatus::Active, update)
            .await?;

        match updated {
            Some(booking) => {
                info!(booking_id = %id, "Rental completed");
                Ok(booking)
            }
            None => Err(self.transition_failed(id, "complete").await),
        }
    }

    /// Cancel a booking
    ///
    /// Customers can cancel their own bookings; admins can cancel any.
    /// Terminal bookings cannot be cancelled.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Uuid, requester_id: i32, is_admin: bool) -> AppResult<Booking> {
        let booking = self.get_booking(id, requester_id, is_admin).await?;

        if !booking.status.can_cancel() {
            return Err(AppError::invalid_transition(booking.status, "cancel"));
        }

        let updated = self.booking_repo.cancel(id, booking.status).await?;

        match updated {
            Some(booking) => {
                info!(booking_id = %id, "Booking cancelled");
                Ok(booking)
            }
            None => Err(self.transition_failed(id, "cancel").await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        full_documents, test_input, test_vehicle, MockBookingRepository, MockVehicleRepository,
    };
    use chrono::Duration;
    use rentwheels_core::models::PaymentStatus;
    use rentwheels_core::traits::Repository;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn manager() -> (
        BookingManager<MockBookingRepository, MockVehicleRepository>,
        Uuid,
    ) {
        let vehicle = test_vehicle();
        let vehicle_id = vehicle.id;
        let manager = BookingManager::new(
            Arc::new(MockBookingRepository::new()),
            Arc::new(MockVehicleRepository::with_vehicle(vehicle)),
            BookingConfig::default(),
        );
        (manager, vehicle_id)
    }

    const CUSTOMER: i32 = 7;
    const ADMIN: i32 = 1;

    #[tokio::test]
    async fn test_create_booking_snapshots_price_and_deposit() {
        let (manager, vehicle_id) = manager();

        let booking = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.total_price, dec!(2500));
        assert_eq!(booking.deposit_amount, dec!(20000));
        assert_eq!(booking.customer_id, CUSTOMER);
    }

    #[tokio::test]
    async fn test_create_booking_with_driver() {
        let (manager, vehicle_id) = manager();

        let mut input = test_input(vehicle_id);
        input.with_driver = true;

        let booking = manager
            .create_booking(CUSTOMER, input, full_documents())
            .await
            .unwrap();

        // 2500 rental plus one driver day at 500
        assert_eq!(booking.total_price, dec!(3000));
    }

    #[tokio::test]
    async fn test_create_booking_missing_documents() {
        let (manager, vehicle_id) = manager();

        let documents = DocumentSet {
            driving_license: Some("/uploads/dl.jpg".to_string()),
            id_card: None,
            live_photo: None,
        };

        let err = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), documents)
            .await
            .unwrap_err();

        match err {
            AppError::DocumentsMissing(missing) => {
                assert_eq!(missing, vec!["id_card", "live_photo"]);
            }
            other => panic!("expected documents error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_booking_invalid_duration() {
        let (manager, vehicle_id) = manager();

        let mut input = test_input(vehicle_id);
        input.duration_hours = 13;

        let err = manager
            .create_booking(CUSTOMER, input, full_documents())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidDuration(13)));

        let mut input = test_input(vehicle_id);
        input.duration_hours = 999_996; // multiple of 12 over the cap

        let err = manager
            .create_booking(CUSTOMER, input, full_documents())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidDuration(_)));
    }

    #[tokio::test]
    async fn test_create_booking_honors_delivery_limit() {
        let vehicle = test_vehicle();
        let vehicle_id = vehicle.id;
        let manager = BookingManager::new(
            Arc::new(MockBookingRepository::new()),
            Arc::new(MockVehicleRepository::with_vehicle(vehicle)),
            BookingConfig {
                max_delivery_distance_km: 25,
                ..BookingConfig::default()
            },
        );

        let mut input = test_input(vehicle_id);
        input.home_delivery = true;
        input.delivery_address = Some("Flat 4, Green Residency, Pune".to_string());
        input.delivery_distance_km = 40;

        let err = manager
            .create_booking(CUSTOMER, input, full_documents())
            .await
            .unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields[0].field, "deliveryDistance");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_booking_unavailable_vehicle() {
        let vehicle = Vehicle {
            available: false,
            ..test_vehicle()
        };
        let vehicle_id = vehicle.id;
        let manager = BookingManager::new(
            Arc::new(MockBookingRepository::new()),
            Arc::new(MockVehicleRepository::with_vehicle(vehicle)),
            BookingConfig::default(),
        );

        let err = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VehicleUnavailable(_)));
    }

    #[tokio::test]
    async fn test_deposit_snapshot_survives_vehicle_change() {
        let vehicle = test_vehicle();
        let vehicle_id = vehicle.id;
        let vehicle_repo = Arc::new(MockVehicleRepository::with_vehicle(vehicle.clone()));
        let manager = BookingManager::new(
            Arc::new(MockBookingRepository::new()),
            vehicle_repo.clone(),
            BookingConfig::default(),
        );

        let booking = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();

        // Raise the vehicle's deposit after the booking exists
        let mut updated = vehicle;
        updated.security_deposit = dec!(50000);
        vehicle_repo.update(&updated).await.unwrap();

        let reloaded = manager
            .get_booking(booking.id, CUSTOMER, false)
            .await
            .unwrap();
        assert_eq!(reloaded.deposit_amount, dec!(20000));
    }

    #[tokio::test]
    async fn test_review_accept_and_decline() {
        let (manager, vehicle_id) = manager();

        let accepted = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();
        let declined = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();

        let accepted = manager
            .review(accepted.id, ReviewAction::Accept, Some("ok".to_string()))
            .await
            .unwrap();
        assert_eq!(accepted.status, BookingStatus::Accepted);
        assert_eq!(accepted.admin_notes.as_deref(), Some("ok"));

        let declined = manager
            .review(declined.id, ReviewAction::Decline, None)
            .await
            .unwrap();
        assert_eq!(declined.status, BookingStatus::Declined);
    }

    #[tokio::test]
    async fn test_review_rejected_after_decision() {
        let (manager, vehicle_id) = manager();

        let booking = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();

        manager
            .review(booking.id, ReviewAction::Accept, None)
            .await
            .unwrap();

        let err = manager
            .review(booking.id, ReviewAction::Decline, None)
            .await
            .unwrap_err();
        match err {
            AppError::InvalidTransition { from, action } => {
                assert_eq!(from, "accepted");
                assert_eq!(action, "review");
            }
            other => panic!("expected invalid transition, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_requires_paid() {
        let (manager, vehicle_id) = manager();

        let booking = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();

        let err = manager
            .start_rental(booking.id, "Swift".to_string(), "MH12AB1234".to_string(), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    async fn drive_to_paid(
        manager: &BookingManager<MockBookingRepository, MockVehicleRepository>,
        vehicle_id: Uuid,
    ) -> Booking {
        let booking = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();
        manager
            .review(booking.id, ReviewAction::Accept, None)
            .await
            .unwrap();
        manager
            .booking_repo
            .attach_order(booking.id, BookingStatus::Accepted, "order_123")
            .await
            .unwrap()
            .unwrap();
        manager
            .booking_repo
            .record_payment(
                booking.id,
                BookingStatus::PaymentPending,
                "pay_123",
                PaymentStatus::Completed,
            )
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_lifecycle_on_time_return() {
        let (manager, vehicle_id) = manager();
        let booking = drive_to_paid(&manager, vehicle_id).await;

        let active = manager
            .start_rental(booking.id, "Swift".to_string(), "MH12AB1234".to_string(), 100)
            .await
            .unwrap();
        assert_eq!(active.status, BookingStatus::Active);
        assert_eq!(active.start_odometer, Some(100));

        let returned_at = active.end_time - Duration::hours(1);
        let completed = manager
            .complete_rental(booking.id, 350, Some(returned_at))
            .await
            .unwrap();

        assert_eq!(completed.status, BookingStatus::Completed);
        assert_eq!(completed.late_hours, Some(0));
        assert_eq!(completed.late_fee, Some(Decimal::ZERO));
        assert_eq!(completed.end_odometer, Some(350));
    }

    #[tokio::test]
    async fn test_late_return_billed_in_blocks() {
        let (manager, vehicle_id) = manager();
        let booking = drive_to_paid(&manager, vehicle_id).await;

        manager
            .start_rental(booking.id, "Swift".to_string(), "MH12AB1234".to_string(), 100)
            .await
            .unwrap();

        // 15 hours late starts a second 12-hour block
        let returned_at = booking.end_time + Duration::hours(15);
        let completed = manager
            .complete_rental(booking.id, 500, Some(returned_at))
            .await
            .unwrap();

        assert_eq!(completed.late_hours, Some(15));
        assert_eq!(completed.late_fee, Some(dec!(3000))); // 2 blocks at 1500
    }

    #[tokio::test]
    async fn test_complete_rejects_odometer_below_start() {
        let (manager, vehicle_id) = manager();
        let booking = drive_to_paid(&manager, vehicle_id).await;

        manager
            .start_rental(booking.id, "Swift".to_string(), "MH12AB1234".to_string(), 400)
            .await
            .unwrap();

        let err = manager
            .complete_rental(booking.id, 300, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let (manager, vehicle_id) = manager();

        let booking = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();

        // Another customer cannot even see the booking
        let err = manager.cancel(booking.id, 99, false).await.unwrap_err();
        assert!(matches!(err, AppError::BookingNotFound(_)));

        // The owner can cancel
        let cancelled = manager.cancel(booking.id, CUSTOMER, false).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        // Terminal bookings cannot be cancelled again, even by an admin
        let err = manager.cancel(booking.id, ADMIN, true).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_declined_booking_cannot_start() {
        let (manager, vehicle_id) = manager();

        let booking = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();
        manager
            .review(booking.id, ReviewAction::Decline, None)
            .await
            .unwrap();

        let err = manager
            .start_rental(booking.id, "Swift".to_string(), "MH12AB1234".to_string(), 0)
            .await
            .unwrap_err();
        match err {
            AppError::InvalidTransition { from, .. } => assert_eq!(from, "declined"),
            other => panic!("expected invalid transition, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_booking_ownership() {
        let (manager, vehicle_id) = manager();

        let booking = manager
            .create_booking(CUSTOMER, test_input(vehicle_id), full_documents())
            .await
            .unwrap();

        assert!(manager.get_booking(booking.id, CUSTOMER, false).await.is_ok());
        assert!(manager.get_booking(booking.id, ADMIN, true).await.is_ok());
        assert!(manager.get_booking(booking.id, 99, false).await.is_err());
    }
}
