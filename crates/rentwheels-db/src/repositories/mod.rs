//! Repository implementations

pub mod booking_repo;
pub mod user_repo;
pub mod vehicle_repo;

pub use booking_repo::PgBookingRepository;
pub use user_repo::PgUserRepository;
pub use vehicle_repo::PgVehicleRepository;
