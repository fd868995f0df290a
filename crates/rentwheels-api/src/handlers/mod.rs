//! HTTP handlers

pub mod auth;
pub mod booking;
pub mod dashboard;
pub mod payment;
pub mod vehicle;

pub use auth::configure as configure_auth;
pub use booking::configure as configure_bookings;
pub use dashboard::configure as configure_dashboard;
pub use payment::configure as configure_payments;
pub use vehicle::configure as configure_vehicles;
