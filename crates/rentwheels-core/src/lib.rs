//! RentWheels Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the RentWheels booking system. It includes:
//!
//! - Domain models (Vehicle, Booking, User)
//! - The pricing engine for rental and late-fee computation
//! - Field validation rules for booking applications
//! - Common traits for repositories and external collaborators
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod traits;
pub mod validation;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
