//! RentWheels Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the RentWheels booking system. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for users, vehicles and bookings
//! - Compare-and-set booking status transitions
//! - Schema migrations

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use rentwheels_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
