//! API layer for RentWheels
//!
//! HTTP handlers for the booking, payment, fleet and account endpoints.

pub mod dto;
pub mod handlers;

use rentwheels_db::{PgBookingRepository, PgVehicleRepository};
use rentwheels_services::{BookingManager, PaymentManager, RazorpayClient};

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export handler configuration functions
pub use handlers::{
    configure_auth, configure_bookings, configure_dashboard, configure_payments,
    configure_vehicles,
};

/// Booking manager wired to the Postgres repositories
pub type BookingService = BookingManager<PgBookingRepository, PgVehicleRepository>;

/// Payment manager wired to the Postgres repository and the Razorpay gateway
pub type PaymentService = PaymentManager<PgBookingRepository, RazorpayClient>;
