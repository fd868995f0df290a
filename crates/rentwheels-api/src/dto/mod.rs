//! Data transfer objects for the HTTP API

pub mod auth;
pub mod booking;
pub mod common;
pub mod payment;
pub mod vehicle;

pub use common::{ApiResponse, PaginationParams};
