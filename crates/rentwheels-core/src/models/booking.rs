//! Booking model and lifecycle
//!
//! A booking passes through an operational lifecycle driven by customer and
//! admin actions:
//!
//! 1. Created by a customer (`pending`)
//! 2. Reviewed by an admin (`accepted` or `declined`)
//! 3. Awaiting payment once an order exists (`payment_pending`)
//! 4. Paid after gateway verification (`paid`)
//! 5. Vehicle handed over (`active`) and returned (`completed`)
//!
//! Any non-terminal booking can be `cancelled`. Price and deposit are
//! snapshotted at creation and never recomputed afterwards.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Submitted, awaiting admin review
    #[default]
    Pending,
    /// Approved by an admin
    Accepted,
    /// Rejected by an admin (terminal)
    Declined,
    /// Payment order created, awaiting payment
    PaymentPending,
    /// Payment verified
    Paid,
    /// Vehicle handed over, rental in progress
    Active,
    /// Vehicle returned (terminal)
    Completed,
    /// Cancelled before completion (terminal)
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Accepted => write!(f, "accepted"),
            BookingStatus::Declined => write!(f, "declined"),
            BookingStatus::PaymentPending => write!(f, "payment_pending"),
            BookingStatus::Paid => write!(f, "paid"),
            BookingStatus::Active => write!(f, "active"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl BookingStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "accepted" => Some(BookingStatus::Accepted),
            "declined" => Some(BookingStatus::Declined),
            "payment_pending" => Some(BookingStatus::PaymentPending),
            "paid" => Some(BookingStatus::Paid),
            "active" => Some(BookingStatus::Active),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// All status values, useful for exhaustive checks in tests
    pub fn all() -> [BookingStatus; 8] {
        [
            BookingStatus::Pending,
            BookingStatus::Accepted,
            BookingStatus::Declined,
            BookingStatus::PaymentPending,
            BookingStatus::Paid,
            BookingStatus::Active,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ]
    }

    /// Check if this status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Declined | BookingStatus::Completed | BookingStatus::Cancelled
        )
    }

    /// Check if an admin review (accept/decline) is legal from this status
    pub fn can_review(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    /// Check if a payment order may be created from this status
    pub fn can_create_order(&self) -> bool {
        matches!(self, BookingStatus::Accepted | BookingStatus::PaymentPending)
    }

    /// Check if the rental can be started (vehicle handover) from this status
    pub fn can_start(&self) -> bool {
        matches!(self, BookingStatus::Paid)
    }

    /// Check if the rental can be completed from this status
    pub fn can_complete(&self) -> bool {
        matches!(self, BookingStatus::Active)
    }

    /// Check if the booking can be cancelled from this status
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }
}

/// Payment status, tracked independently from the booking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl PaymentStatus {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// How the customer provides the security deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DepositType {
    /// Cash at handover
    #[default]
    Cash,
    /// A two-wheeler left as collateral (requires a description)
    Bike,
    /// Collected with the rental payment through the gateway
    Online,
}

impl fmt::Display for DepositType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepositType::Cash => write!(f, "cash"),
            DepositType::Bike => write!(f, "bike"),
            DepositType::Online => write!(f, "online"),
        }
    }
}

impl DepositType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(DepositType::Cash),
            "bike" => Some(DepositType::Bike),
            "online" => Some(DepositType::Online),
            _ => None,
        }
    }
}

/// Relation of the applicant to their guardian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GuardianRelation {
    /// Son of
    #[default]
    #[serde(rename = "S/o")]
    SonOf,
    /// Wife of
    #[serde(rename = "W/o")]
    WifeOf,
    /// Daughter of
    #[serde(rename = "D/o")]
    DaughterOf,
}

impl fmt::Display for GuardianRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardianRelation::SonOf => write!(f, "S/o"),
            GuardianRelation::WifeOf => write!(f, "W/o"),
            GuardianRelation::DaughterOf => write!(f, "D/o"),
        }
    }
}

impl GuardianRelation {
    /// Parse from the form encoding ("S/o", "W/o", "D/o")
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "S/o" => Some(GuardianRelation::SonOf),
            "W/o" => Some(GuardianRelation::WifeOf),
            "D/o" => Some(GuardianRelation::DaughterOf),
            _ => None,
        }
    }
}

/// The three identity documents required on every booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Driving licence image
    DrivingLicense,
    /// Government ID card image
    IdCard,
    /// Live photo captured at submission
    LivePhoto,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::DrivingLicense => write!(f, "driving_license"),
            DocumentKind::IdCard => write!(f, "id_card"),
            DocumentKind::LivePhoto => write!(f, "live_photo"),
        }
    }
}

impl DocumentKind {
    /// All required kinds
    pub fn required() -> [DocumentKind; 3] {
        [
            DocumentKind::DrivingLicense,
            DocumentKind::IdCard,
            DocumentKind::LivePhoto,
        ]
    }
}

/// Admin review verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Accept,
    Decline,
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewAction::Accept => write!(f, "accept"),
            ReviewAction::Decline => write!(f, "decline"),
        }
    }
}

/// Validated booking application, produced by the API layer
///
/// Every optional-with-default field is resolved here so downstream code
/// never guesses (e.g. `delivery_distance_km` is an explicit 0 rather than
/// an absent value when home delivery is off).
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_hours: i32,

    pub full_name: String,
    pub guardian_name: String,
    pub guardian_relation: GuardianRelation,
    pub residential_address: String,
    pub email: String,
    pub mobile: String,
    pub occupation: String,
    pub reference1_name: String,
    pub reference1_mobile: String,
    pub reference2_name: String,
    pub reference2_mobile: String,

    pub license_number: String,
    pub license_expiry: DateTime<Utc>,

    pub deposit_type: DepositType,
    pub bike_details: Option<String>,
    pub with_driver: bool,

    pub home_delivery: bool,
    pub delivery_address: Option<String>,
    pub delivery_distance_km: i32,
}

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: Uuid,

    /// Booked vehicle
    pub vehicle_id: Uuid,

    /// Owning customer
    pub customer_id: i32,

    /// Current lifecycle status
    pub status: BookingStatus,

    /// Payment status
    pub payment_status: PaymentStatus,

    /// Requested start of the rental
    pub start_time: DateTime<Utc>,

    /// Rental duration in hours (positive multiple of 12)
    pub duration_hours: i32,

    /// Scheduled end (start + duration)
    pub end_time: DateTime<Utc>,

    /// Total rental price, snapshotted at creation
    pub total_price: Decimal,

    /// Security deposit, snapshotted from the vehicle at creation
    pub deposit_amount: Decimal,

    // Applicant details
    pub full_name: String,
    pub guardian_name: String,
    pub guardian_relation: GuardianRelation,
    pub residential_address: String,
    pub email: String,
    pub mobile: String,
    pub occupation: String,
    pub reference1_name: String,
    pub reference1_mobile: String,
    pub reference2_name: String,
    pub reference2_mobile: String,

    // Licence details
    pub license_number: String,
    pub license_expiry: DateTime<Utc>,

    // Deposit and options
    pub deposit_type: DepositType,
    pub bike_details: Option<String>,
    pub with_driver: bool,
    pub home_delivery: bool,
    pub delivery_address: Option<String>,
    pub delivery_distance_km: i32,

    // Document URLs (exactly one per kind, set at creation)
    pub driving_license_url: String,
    pub id_card_url: String,
    pub live_photo_url: String,

    // Payment gateway references
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,

    /// Notes recorded by the reviewing admin
    pub admin_notes: Option<String>,

    // Operational fields, populated at handover
    pub assigned_vehicle_name: Option<String>,
    pub assigned_vehicle_number: Option<String>,
    pub start_odometer: Option<i32>,

    // Operational fields, populated at return
    pub end_odometer: Option<i32>,
    pub actual_return_time: Option<DateTime<Utc>>,
    pub late_hours: Option<i32>,
    pub late_fee: Option<Decimal>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Assemble a booking from a validated application plus the amounts
    /// computed by the pricing engine and the stored document URLs.
    pub fn from_application(
        customer_id: i32,
        input: NewBooking,
        total_price: Decimal,
        deposit_amount: Decimal,
        driving_license_url: String,
        id_card_url: String,
        live_photo_url: String,
    ) -> Self {
        let now = Utc::now();
        let end_time = input.start_time + Duration::hours(i64::from(input.duration_hours));

        Self {
            id: Uuid::new_v4(),
            vehicle_id: input.vehicle_id,
            customer_id,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            start_time: input.start_time,
            duration_hours: input.duration_hours,
            end_time,
            total_price,
            deposit_amount,
            full_name: input.full_name,
            guardian_name: input.guardian_name,
            guardian_relation: input.guardian_relation,
            residential_address: input.residential_address,
            email: input.email,
            mobile: input.mobile,
            occupation: input.occupation,
            reference1_name: input.reference1_name,
            reference1_mobile: input.reference1_mobile,
            reference2_name: input.reference2_name,
            reference2_mobile: input.reference2_mobile,
            license_number: input.license_number,
            license_expiry: input.license_expiry,
            deposit_type: input.deposit_type,
            bike_details: input.bike_details,
            with_driver: input.with_driver,
            home_delivery: input.home_delivery,
            delivery_address: input.delivery_address,
            delivery_distance_km: input.delivery_distance_km,
            driving_license_url,
            id_card_url,
            live_photo_url,
            gateway_order_id: None,
            gateway_payment_id: None,
            admin_notes: None,
            assigned_vehicle_name: None,
            assigned_vehicle_number: None,
            start_odometer: None,
            end_odometer: None,
            actual_return_time: None,
            late_hours: None,
            late_fee: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Amount due through the payment gateway: the rental price, plus the
    /// deposit when it is collected online.
    pub fn amount_due(&self) -> Decimal {
        match self.deposit_type {
            DepositType::Online => self.total_price + self.deposit_amount,
            DepositType::Cash | DepositType::Bike => self.total_price,
        }
    }

    /// Whole hours the vehicle was returned past the scheduled end, floored at zero
    pub fn late_hours_at(&self, returned_at: DateTime<Utc>) -> i32 {
        let late = (returned_at - self.end_time).num_hours();
        late.max(0) as i32
    }
}
