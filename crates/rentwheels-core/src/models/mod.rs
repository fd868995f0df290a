//! Domain models for RentWheels
//!
//! This module contains all the core domain models used throughout the application.

pub mod booking;
pub mod user;
pub mod vehicle;

pub use booking::{
    Booking, BookingStatus, DepositType, DocumentKind, GuardianRelation, NewBooking,
    PaymentStatus, ReviewAction,
};
pub use user::{User, UserInfo, UserRole};
pub use vehicle::{FuelType, GearType, PriceTable, Vehicle, VehicleTier};
