//! RentWheels Business Services
//!
//! This crate implements the business logic of the booking system on top of
//! the repository traits from `rentwheels-core`:
//!
//! - `BookingManager` drives the booking lifecycle state machine
//! - `PaymentManager` creates gateway orders and reconciles payments
//! - `RazorpayClient` talks to the Razorpay REST API
//! - `LocalDocumentStore` persists uploaded identity documents

pub mod booking_manager;
pub mod documents;
pub mod payments;

#[cfg(test)]
pub(crate) mod test_support;

pub use booking_manager::{BookingManager, DocumentSet};
pub use documents::LocalDocumentStore;
pub use payments::{PaymentManager, RazorpayClient};
