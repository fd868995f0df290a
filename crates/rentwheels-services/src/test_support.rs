//! In-memory repository and gateway doubles shared by the service tests

use crate::booking_manager::DocumentSet;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rentwheels_core::{
    models::{
        Booking, BookingStatus, DepositType, GuardianRelation, NewBooking, PaymentStatus,
        PriceTable, Vehicle, VehicleTier,
    },
    traits::{
        BookingRepository, GatewayOrder, HandoverUpdate, PaymentGateway, Repository,
        ReturnUpdate, ReviewUpdate, VehicleRepository,
    },
    AppError, AppResult,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

pub(crate) struct MockBookingRepository {
    bookings: Mutex<HashMap<Uuid, Booking>>,
}

impl MockBookingRepository {
    pub(crate) fn new() -> Self {
        Self {
            bookings: Mutex::new(HashMap::new()),
        }
    }

    fn cas<F>(&self, id: Uuid, expected: BookingStatus, apply: F) -> Option<Booking>
    where
        F: FnOnce(&mut Booking),
    {
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings.get_mut(&id)?;
        if booking.status != expected {
            return None;
        }
        apply(booking);
        booking.updated_at = Utc::now();
        Some(booking.clone())
    }
}

#[async_trait]
impl Repository<Booking, Uuid> for MockBookingRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.bookings.lock().unwrap().get(&id).cloned())
    }

    async fn find_all(&self, _limit: i64, _offset: i64) -> AppResult<Vec<Booking>> {
        Ok(self.bookings.lock().unwrap().values().cloned().collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.bookings.lock().unwrap().len() as i64)
    }

    async fn create(&self, entity: &Booking) -> AppResult<Booking> {
        self.bookings
            .lock()
            .unwrap()
            .insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn update(&self, entity: &Booking) -> AppResult<Booking> {
        self.bookings
            .lock()
            .unwrap()
            .insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.bookings.lock().unwrap().remove(&id).is_some())
    }
}

#[async_trait]
impl BookingRepository for MockBookingRepository {
    async fn find_by_customer(&self, customer_id: i32) -> AppResult<Vec<Booking>> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn list_filtered(
        &self,
        status: Option<BookingStatus>,
        _limit: i64,
        _offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        let bookings: Vec<Booking> = self
            .bookings
            .lock()
            .unwrap()
            .values()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        let total = bookings.len() as i64;
        Ok((bookings, total))
    }

    async fn count_by_status(&self) -> AppResult<Vec<(BookingStatus, i64)>> {
        let mut counts: HashMap<BookingStatus, i64> = HashMap::new();
        for booking in self.bookings.lock().unwrap().values() {
            *counts.entry(booking.status).or_insert(0) += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn apply_review(
        &self,
        id: Uuid,
        expected: BookingStatus,
        update: ReviewUpdate,
    ) -> AppResult<Option<Booking>> {
        Ok(self.cas(id, expected, |b| {
            b.status = update.new_status;
            b.admin_notes = update.admin_notes.clone();
        }))
    }

    async fn attach_order(
        &self,
        id: Uuid,
        expected: BookingStatus,
        order_id: &str,
    ) -> AppResult<Option<Booking>> {
        Ok(self.cas(id, expected, |b| {
            b.status = BookingStatus::PaymentPending;
            b.gateway_order_id = Some(order_id.to_string());
        }))
    }

    async fn record_payment(
        &self,
        id: Uuid,
        expected: BookingStatus,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> AppResult<Option<Booking>> {
        Ok(self.cas(id, expected, |b| {
            b.status = BookingStatus::Paid;
            b.payment_status = payment_status;
            b.gateway_payment_id = Some(payment_id.to_string());
        }))
    }

    async fn start_rental(
        &self,
        id: Uuid,
        expected: BookingStatus,
        update: HandoverUpdate,
    ) -> AppResult<Option<Booking>> {
        Ok(self.cas(id, expected, |b| {
            b.status = BookingStatus::Active;
            b.assigned_vehicle_name = Some(update.vehicle_name.clone());
            b.assigned_vehicle_number = Some(update.vehicle_number.clone());
            b.start_odometer = Some(update.start_odometer);
        }))
    }

    async fn complete_rental(
        &self,
        id: Uuid,
        expected: BookingStatus,
        update: ReturnUpdate,
    ) -> AppResult<Option<Booking>> {
        Ok(self.cas(id, expected, |b| {
            b.status = BookingStatus::Completed;
            b.end_odometer = Some(update.end_odometer);
            b.actual_return_time = Some(update.actual_return_time);
            b.late_hours = Some(update.late_hours);
            b.late_fee = Some(update.late_fee);
        }))
    }

    async fn cancel(&self, id: Uuid, expected: BookingStatus) -> AppResult<Option<Booking>> {
        Ok(self.cas(id, expected, |b| {
            b.status = BookingStatus::Cancelled;
        }))
    }
}

pub(crate) struct MockVehicleRepository {
    vehicles: Mutex<HashMap<Uuid, Vehicle>>,
}

impl MockVehicleRepository {
    pub(crate) fn with_vehicle(vehicle: Vehicle) -> Self {
        let mut vehicles = HashMap::new();
        vehicles.insert(vehicle.id, vehicle);
        Self {
            vehicles: Mutex::new(vehicles),
        }
    }
}

#[async_trait]
impl Repository<Vehicle, Uuid> for MockVehicleRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.vehicles.lock().unwrap().get(&id).cloned())
    }

    async fn find_all(&self, _limit: i64, _offset: i64) -> AppResult<Vec<Vehicle>> {
        Ok(self.vehicles.lock().unwrap().values().cloned().collect())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.vehicles.lock().unwrap().len() as i64)
    }

    async fn create(&self, entity: &Vehicle) -> AppResult<Vehicle> {
        self.vehicles
            .lock()
            .unwrap()
            .insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn update(&self, entity: &Vehicle) -> AppResult<Vehicle> {
        self.vehicles
            .lock()
            .unwrap()
            .insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.vehicles.lock().unwrap().remove(&id).is_some())
    }
}

#[async_trait]
impl VehicleRepository for MockVehicleRepository {
    async fn list_filtered(
        &self,
        available_only: bool,
        _limit: i64,
        _offset: i64,
    ) -> AppResult<(Vec<Vehicle>, i64)> {
        let vehicles: Vec<Vehicle> = self
            .vehicles
            .lock()
            .unwrap()
            .values()
            .filter(|v| !available_only || v.available)
            .cloned()
            .collect();
        let total = vehicles.len() as i64;
        Ok((vehicles, total))
    }

    async fn set_available(&self, id: Uuid, available: bool) -> AppResult<bool> {
        let mut vehicles = self.vehicles.lock().unwrap();
        match vehicles.get_mut(&id) {
            Some(v) => {
                v.available = available;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Gateway double that accepts a single known signature
pub(crate) struct MockGateway {
    pub(crate) valid_signature: String,
    pub(crate) fail_order_creation: bool,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self {
            valid_signature: "good-signature".to_string(),
            fail_order_creation: false,
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(&self, amount: Decimal, receipt: &str) -> AppResult<GatewayOrder> {
        if self.fail_order_creation {
            return Err(AppError::Gateway("order creation refused".to_string()));
        }
        Ok(GatewayOrder {
            order_id: format!("order_{}", receipt),
            amount_minor: (amount * Decimal::from(100)).try_into().unwrap_or(0),
            currency: "INR".to_string(),
        })
    }

    fn verify_signature(&self, _order_id: &str, _payment_id: &str, signature: &str) -> bool {
        signature == self.valid_signature
    }
}

pub(crate) fn test_vehicle() -> Vehicle {
    Vehicle {
        name: "Swift Dzire".to_string(),
        model: "Dzire VXI".to_string(),
        brand: "Maruti".to_string(),
        tier: VehicleTier::Normal,
        pricing: PriceTable {
            price_12hr: dec!(1500),
            price_24hr: dec!(2500),
            price_36hr: dec!(3400),
            price_48hr: dec!(4200),
            price_60hr: dec!(5000),
            price_72hr: dec!(5700),
        },
        security_deposit: dec!(20000),
        driver_available: true,
        driver_charges_per_day: dec!(500),
        ..Default::default()
    }
}

pub(crate) fn test_input(vehicle_id: Uuid) -> NewBooking {
    NewBooking {
        vehicle_id,
        start_time: Utc::now() + Duration::hours(24),
        duration_hours: 24,
        full_name: "Asha Verma".to_string(),
        guardian_name: "Ravi Verma".to_string(),
        guardian_relation: GuardianRelation::DaughterOf,
        residential_address: "12 MG Road, Pune 411001".to_string(),
        email: "asha@example.com".to_string(),
        mobile: "9876543210".to_string(),
        occupation: "Engineer".to_string(),
        reference1_name: "Kiran Rao".to_string(),
        reference1_mobile: "9123456780".to_string(),
        reference2_name: "Meera Shah".to_string(),
        reference2_mobile: "9988776655".to_string(),
        license_number: "MH1220210012345".to_string(),
        license_expiry: Utc::now() + Duration::days(365),
        deposit_type: DepositType::Cash,
        bike_details: None,
        with_driver: false,
        home_delivery: false,
        delivery_address: None,
        delivery_distance_km: 0,
    }
}

pub(crate) fn full_documents() -> DocumentSet {
    DocumentSet {
        driving_license: Some("/uploads/dl.jpg".to_string()),
        id_card: Some("/uploads/id.jpg".to_string()),
        live_photo: Some("/uploads/live.jpg".to_string()),
    }
}
