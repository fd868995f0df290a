//! Booking DTOs
//!
//! Booking applications arrive as multipart forms because the three identity
//! documents are uploaded together with the applicant details.

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use rentwheels_core::models::{DepositType, GuardianRelation, NewBooking, ReviewAction};
use rentwheels_core::AppError;
use serde::Deserialize;
use uuid::Uuid;

/// Booking application form
///
/// Field names follow the web client's camelCase convention, which is also
/// the convention used in validation error payloads.
#[derive(Debug, MultipartForm)]
pub struct CreateBookingForm {
    #[multipart(rename = "vehicleId")]
    pub vehicle_id: Text<Uuid>,

    #[multipart(rename = "startTime")]
    pub start_time: Text<DateTime<Utc>>,

    #[multipart(rename = "durationHours")]
    pub duration_hours: Text<i32>,

    #[multipart(rename = "fullName")]
    pub full_name: Text<String>,

    #[multipart(rename = "guardianName")]
    pub guardian_name: Text<String>,

    /// "S/o", "W/o" or "D/o"
    #[multipart(rename = "guardianRelation")]
    pub guardian_relation: Text<String>,

    #[multipart(rename = "residentialAddress")]
    pub residential_address: Text<String>,

    pub email: Text<String>,

    pub mobile: Text<String>,

    pub occupation: Text<String>,

    #[multipart(rename = "reference1Name")]
    pub reference1_name: Text<String>,

    #[multipart(rename = "reference1Mobile")]
    pub reference1_mobile: Text<String>,

    #[multipart(rename = "reference2Name")]
    pub reference2_name: Text<String>,

    #[multipart(rename = "reference2Mobile")]
    pub reference2_mobile: Text<String>,

    #[multipart(rename = "licenseNumber")]
    pub license_number: Text<String>,

    #[multipart(rename = "licenseExpiry")]
    pub license_expiry: Text<DateTime<Utc>>,

    /// "cash", "bike" or "online"
    #[multipart(rename = "depositType")]
    pub deposit_type: Text<String>,

    #[multipart(rename = "bikeDetails")]
    pub bike_details: Option<Text<String>>,

    #[multipart(rename = "withDriver")]
    pub with_driver: Option<Text<bool>>,

    #[multipart(rename = "homeDelivery")]
    pub home_delivery: Option<Text<bool>>,

    #[multipart(rename = "deliveryAddress")]
    pub delivery_address: Option<Text<String>>,

    #[multipart(rename = "deliveryDistanceKm")]
    pub delivery_distance_km: Option<Text<i32>>,

    #[multipart(rename = "drivingLicense", limit = "10MB")]
    pub driving_license: Option<TempFile>,

    #[multipart(rename = "idCard", limit = "10MB")]
    pub id_card: Option<TempFile>,

    #[multipart(rename = "livePhoto", limit = "10MB")]
    pub live_photo: Option<TempFile>,
}

impl CreateBookingForm {
    /// Convert the form fields into a booking application
    ///
    /// Enum-like string fields are parsed here so the client gets a field
    /// error rather than a generic deserialization failure.
    pub fn into_application(self) -> Result<NewBooking, AppError> {
        let guardian_relation =
            GuardianRelation::from_str(&self.guardian_relation).ok_or_else(|| {
                AppError::validation_field(
                    "guardianRelation",
                    "Guardian relation must be one of S/o, W/o, D/o",
                )
            })?;

        let deposit_type = DepositType::from_str(&self.deposit_type).ok_or_else(|| {
            AppError::validation_field(
                "depositType",
                "Deposit type must be one of cash, bike, online",
            )
        })?;

        Ok(NewBooking {
            vehicle_id: self.vehicle_id.0,
            start_time: self.start_time.0,
            duration_hours: self.duration_hours.0,
            full_name: self.full_name.0,
            guardian_name: self.guardian_name.0,
            guardian_relation,
            residential_address: self.residential_address.0,
            email: self.email.0,
            mobile: self.mobile.0,
            occupation: self.occupation.0,
            reference1_name: self.reference1_name.0,
            reference1_mobile: self.reference1_mobile.0,
            reference2_name: self.reference2_name.0,
            reference2_mobile: self.reference2_mobile.0,
            license_number: self.license_number.0,
            license_expiry: self.license_expiry.0,
            deposit_type,
            bike_details: self.bike_details.map(|t| t.0),
            with_driver: self.with_driver.map(|t| t.0).unwrap_or(false),
            home_delivery: self.home_delivery.map(|t| t.0).unwrap_or(false),
            delivery_address: self.delivery_address.map(|t| t.0),
            delivery_distance_km: self.delivery_distance_km.map(|t| t.0).unwrap_or(0),
        })
    }
}

/// Admin review request
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    pub admin_notes: Option<String>,
}

/// Vehicle handover request (admin)
#[derive(Debug, Clone, Deserialize)]
pub struct StartRentalRequest {
    pub vehicle_name: String,
    pub vehicle_number: String,
    pub start_odometer: i32,
}

/// Vehicle return request (admin)
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteRentalRequest {
    pub end_odometer: i32,
    /// Defaults to now when omitted
    pub actual_return_time: Option<DateTime<Utc>>,
}

/// Admin booking listing query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingQuery {
    /// Filter by lifecycle status
    pub status: Option<String>,

    #[serde(flatten)]
    pub pagination: crate::dto::PaginationParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_request_parses_action() {
        let req: ReviewRequest =
            serde_json::from_str(r#"{"action": "accept", "admin_notes": "ok"}"#).unwrap();
        assert_eq!(req.action, ReviewAction::Accept);
        assert_eq!(req.admin_notes.as_deref(), Some("ok"));

        let req: ReviewRequest = serde_json::from_str(r#"{"action": "decline"}"#).unwrap();
        assert_eq!(req.action, ReviewAction::Decline);
        assert!(serde_json::from_str::<ReviewRequest>(r#"{"action": "maybe"}"#).is_err());
    }

    #[test]
    fn test_booking_query_defaults() {
        let query: BookingQuery = serde_json::from_str("{}").unwrap();
        assert!(query.status.is_none());
        assert_eq!(query.pagination.page, 1);

        let query: BookingQuery =
            serde_json::from_str(r#"{"status": "pending", "page": 2}"#).unwrap();
        assert_eq!(query.status.as_deref(), Some("pending"));
        assert_eq!(query.pagination.page, 2);
    }
}
