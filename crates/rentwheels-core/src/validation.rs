//! Field validation rules for booking applications
//!
//! All checks on an application run before any of them fails the request, so
//! the response lists every offending field at once.

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AppError, FieldError};
use crate::models::booking::{DepositType, NewBooking};
use crate::AppResult;

lazy_static! {
    /// Indian mobile number: 10 digits starting 6-9
    pub static ref MOBILE_RE: Regex = Regex::new(r"^[6-9]\d{9}$").unwrap();

    /// Person name: letters and spaces only
    pub static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z\s]+$").unwrap();

    /// Driving licence number: uppercase alphanumeric
    pub static ref LICENSE_RE: Regex = Regex::new(r"^[A-Z0-9]+$").unwrap();

    /// Email: local part, @, domain with at least one dot
    pub static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const MIN_NAME_LEN: usize = 2;
const MIN_LICENSE_LEN: usize = 5;
const MIN_ADDRESS_LEN: usize = 10;
const MIN_OCCUPATION_LEN: usize = 2;

fn check_name(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    let value = value.trim();
    if value.len() < MIN_NAME_LEN || !NAME_RE.is_match(value) {
        errors.push(FieldError::new(
            field,
            "Please enter a valid name (letters and spaces, at least 2 characters)",
        ));
    }
}

fn check_mobile(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    if !MOBILE_RE.is_match(value.trim()) {
        errors.push(FieldError::new(
            field,
            "Please enter a valid 10-digit mobile number",
        ));
    }
}

/// Validate a booking application, collecting every failed field
pub fn validate_application(input: &NewBooking, max_delivery_km: i32) -> AppResult<()> {
    let mut errors = Vec::new();

    check_name("fullName", &input.full_name, &mut errors);
    check_name("guardianName", &input.guardian_name, &mut errors);
    check_name("reference1Name", &input.reference1_name, &mut errors);
    check_name("reference2Name", &input.reference2_name, &mut errors);

    if !EMAIL_RE.is_match(input.email.trim()) {
        errors.push(FieldError::new(
            "email",
            "Please enter a valid email address",
        ));
    }

    check_mobile("mobile", &input.mobile, &mut errors);
    check_mobile("reference1Mobile", &input.reference1_mobile, &mut errors);
    check_mobile("reference2Mobile", &input.reference2_mobile, &mut errors);

    if input.residential_address.trim().len() < MIN_ADDRESS_LEN {
        errors.push(FieldError::new(
            "residentialAddress",
            "Address must be at least 10 characters",
        ));
    }

    if input.occupation.trim().len() < MIN_OCCUPATION_LEN {
        errors.push(FieldError::new(
            "occupation",
            "Please enter your occupation",
        ));
    }

    let license = input.license_number.trim();
    if license.len() < MIN_LICENSE_LEN || !LICENSE_RE.is_match(license) {
        errors.push(FieldError::new(
            "licenseNumber",
            "Please enter a valid licence number (uppercase letters and digits, at least 5 characters)",
        ));
    }

    if input.license_expiry <= Utc::now() {
        errors.push(FieldError::new(
            "licenseExpiry",
            "Driving licence has expired",
        ));
    }

    if input.deposit_type == DepositType::Bike {
        let has_details = input
            .bike_details
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false);
        if !has_details {
            errors.push(FieldError::new(
                "bikeDetails",
                "Bike details are required for a bike deposit",
            ));
        }
    }

    if input.home_delivery {
        let has_address = input
            .delivery_address
            .as_deref()
            .map(|a| a.trim().len() >= MIN_ADDRESS_LEN)
            .unwrap_or(false);
        if !has_address {
            errors.push(FieldError::new(
                "deliveryAddress",
                "Delivery address must be at least 10 characters",
            ));
        }
        if input.delivery_distance_km < 0 || input.delivery_distance_km > max_delivery_km {
            errors.push(FieldError::new(
                "deliveryDistance",
                format!("Delivery distance must be between 0 and {} km", max_delivery_km),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
