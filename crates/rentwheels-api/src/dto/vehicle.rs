//! Fleet management DTOs

use chrono::Utc;
use rentwheels_core::models::{FuelType, GearType, PriceTable, Vehicle, VehicleTier};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Vehicle listing query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleQuery {
    /// When true, only vehicles open for booking are returned
    #[serde(default)]
    pub available_only: bool,
}

/// New vehicle request (admin)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(length(min = 1, max = 100))]
    pub brand: String,

    #[validate(range(min = 1990, max = 2100))]
    pub year: i32,

    #[serde(default)]
    pub tier: VehicleTier,

    #[serde(default)]
    pub gear_type: GearType,

    #[serde(default)]
    pub fuel_type: FuelType,

    #[validate(range(min = 1, max = 20))]
    pub seating_capacity: i32,

    pub pricing: PriceTable,

    /// Omitted means the tier default applies
    pub security_deposit: Option<Decimal>,

    #[serde(default)]
    pub driver_available: bool,

    #[serde(default)]
    pub driver_charges_per_day: Decimal,

    pub description: Option<String>,

    #[serde(default)]
    pub features: Vec<String>,

    pub image_url: Option<String>,

    pub registration_number: Option<String>,
}

impl CreateVehicleRequest {
    /// Build the vehicle entity, applying the tier default deposit when unset
    pub fn into_vehicle(self) -> Vehicle {
        let now = Utc::now();
        let security_deposit = self
            .security_deposit
            .unwrap_or_else(|| self.tier.default_deposit());

        Vehicle {
            id: Uuid::new_v4(),
            name: self.name,
            model: self.model,
            brand: self.brand,
            year: self.year,
            tier: self.tier,
            gear_type: self.gear_type,
            fuel_type: self.fuel_type,
            seating_capacity: self.seating_capacity,
            pricing: self.pricing,
            security_deposit,
            driver_available: self.driver_available,
            driver_charges_per_day: self.driver_charges_per_day,
            description: self.description,
            features: self.features,
            image_url: self.image_url,
            registration_number: self.registration_number,
            available: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Vehicle update request (admin), every field optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVehicleRequest {
    pub name: Option<String>,
    pub model: Option<String>,
    pub brand: Option<String>,
    pub year: Option<i32>,
    pub tier: Option<VehicleTier>,
    pub gear_type: Option<GearType>,
    pub fuel_type: Option<FuelType>,
    pub seating_capacity: Option<i32>,
    pub pricing: Option<PriceTable>,
    pub security_deposit: Option<Decimal>,
    pub driver_available: Option<bool>,
    pub driver_charges_per_day: Option<Decimal>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub registration_number: Option<String>,
}

impl UpdateVehicleRequest {
    /// Apply the provided fields onto an existing vehicle
    pub fn apply(self, vehicle: &mut Vehicle) {
        if let Some(name) = self.name {
            vehicle.name = name;
        }
        if let Some(model) = self.model {
            vehicle.model = model;
        }
        if let Some(brand) = self.brand {
            vehicle.brand = brand;
        }
        if let Some(year) = self.year {
            vehicle.year = year;
        }
        if let Some(tier) = self.tier {
            vehicle.tier = tier;
        }
        if let Some(gear_type) = self.gear_type {
            vehicle.gear_type = gear_type;
        }
        if let Some(fuel_type) = self.fuel_type {
            vehicle.fuel_type = fuel_type;
        }
        if let Some(seating_capacity) = self.seating_capacity {
            vehicle.seating_capacity = seating_capacity;
        }
        if let Some(pricing) = self.pricing {
            vehicle.pricing = pricing;
        }
        if let Some(security_deposit) = self.security_deposit {
            vehicle.security_deposit = security_deposit;
        }
        if let Some(driver_available) = self.driver_available {
            vehicle.driver_available = driver_available;
        }
        if let Some(driver_charges_per_day) = self.driver_charges_per_day {
            vehicle.driver_charges_per_day = driver_charges_per_day;
        }
        if let Some(description) = self.description {
            vehicle.description = Some(description);
        }
        if let Some(features) = self.features {
            vehicle.features = features;
        }
        if let Some(image_url) = self.image_url {
            vehicle.image_url = Some(image_url);
        }
        if let Some(registration_number) = self.registration_number {
            vehicle.registration_number = Some(registration_number);
        }
        vehicle.updated_at = Utc::now();
    }
}

/// Availability toggle request (admin)
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}
