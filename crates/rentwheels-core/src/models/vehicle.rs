//! Vehicle (fleet) model
//!
//! Vehicles carry a fixed price table keyed by the six canonical rental
//! duration tiers, plus a security deposit that is snapshotted onto each
//! booking at creation time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Vehicle tier, which drives the default security deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VehicleTier {
    #[default]
    Normal,
    Premium,
    Luxury,
}

impl fmt::Display for VehicleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleTier::Normal => write!(f, "normal"),
            VehicleTier::Premium => write!(f, "premium"),
            VehicleTier::Luxury => write!(f, "luxury"),
        }
    }
}

impl VehicleTier {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(VehicleTier::Normal),
            "premium" => Some(VehicleTier::Premium),
            "luxury" => Some(VehicleTier::Luxury),
            _ => None,
        }
    }

    /// Default security deposit for the tier, used when the vehicle has none configured
    pub fn default_deposit(&self) -> Decimal {
        match self {
            VehicleTier::Normal => Decimal::from(20_000),
            VehicleTier::Premium | VehicleTier::Luxury => Decimal::from(35_000),
        }
    }
}

/// Gearbox type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GearType {
    #[default]
    Manual,
    Auto,
}

impl fmt::Display for GearType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GearType::Manual => write!(f, "manual"),
            GearType::Auto => write!(f, "auto"),
        }
    }
}

impl GearType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Some(GearType::Manual),
            "auto" => Some(GearType::Auto),
            _ => None,
        }
    }
}

/// Fuel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Cng,
    Hybrid,
    Ev,
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelType::Petrol => write!(f, "petrol"),
            FuelType::Diesel => write!(f, "diesel"),
            FuelType::Cng => write!(f, "cng"),
            FuelType::Hybrid => write!(f, "hybrid"),
            FuelType::Ev => write!(f, "ev"),
        }
    }
}

impl FuelType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "petrol" => Some(FuelType::Petrol),
            "diesel" => Some(FuelType::Diesel),
            "cng" => Some(FuelType::Cng),
            "hybrid" => Some(FuelType::Hybrid),
            "ev" => Some(FuelType::Ev),
            _ => None,
        }
    }
}

/// Price table keyed by the six canonical duration tiers (hours)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PriceTable {
    pub price_12hr: Decimal,
    pub price_24hr: Decimal,
    pub price_36hr: Decimal,
    pub price_48hr: Decimal,
    pub price_60hr: Decimal,
    pub price_72hr: Decimal,
}

impl PriceTable {
    /// Look up the price for a canonical duration tier
    ///
    /// Returns `None` for durations outside the six fixed tiers; callers fall
    /// back to the day-rate extension in the pricing engine.
    pub fn tier_price(&self, duration_hours: i32) -> Option<Decimal> {
        match duration_hours {
            12 => Some(self.price_12hr),
            24 => Some(self.price_24hr),
            36 => Some(self.price_36hr),
            48 => Some(self.price_48hr),
            60 => Some(self.price_60hr),
            72 => Some(self.price_72hr),
            _ => None,
        }
    }

    /// Entries in ascending duration order
    pub fn entries(&self) -> [(i32, Decimal); 6] {
        [
            (12, self.price_12hr),
            (24, self.price_24hr),
            (36, self.price_36hr),
            (48, self.price_48hr),
            (60, self.price_60hr),
            (72, self.price_72hr),
        ]
    }

    /// Validate table invariants
    ///
    /// Entries must be non-negative and monotonically non-decreasing with
    /// duration tier.
    pub fn validate(&self) -> Result<(), String> {
        let entries = self.entries();

        for (hours, price) in entries {
            if price < Decimal::ZERO {
                return Err(format!("price for {} hours cannot be negative", hours));
            }
        }

        for pair in entries.windows(2) {
            let (lo_hours, lo_price) = pair[0];
            let (hi_hours, hi_price) = pair[1];
            if hi_price < lo_price {
                return Err(format!(
                    "price for {} hours is lower than price for {} hours",
                    hi_hours, lo_hours
                ));
            }
        }

        Ok(())
    }
}

/// Vehicle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier
    pub id: Uuid,

    /// Display name (e.g. "Swift Dzire")
    pub name: String,

    /// Model name
    pub model: String,

    /// Manufacturer
    pub brand: String,

    /// Manufacturing year
    pub year: i32,

    /// Tier (drives the default deposit)
    pub tier: VehicleTier,

    /// Gearbox
    pub gear_type: GearType,

    /// Fuel
    pub fuel_type: FuelType,

    /// Number of seats
    pub seating_capacity: i32,

    /// Price table for the six duration tiers
    pub pricing: PriceTable,

    /// Refundable security deposit, snapshotted onto bookings at creation
    pub security_deposit: Decimal,

    /// Whether a driver can be hired with this vehicle
    pub driver_available: bool,

    /// Per-day charge when a driver is included
    pub driver_charges_per_day: Decimal,

    /// Optional description
    pub description: Option<String>,

    /// Feature list for display
    pub features: Vec<String>,

    /// Image URL
    pub image_url: Option<String>,

    /// Registration plate number
    pub registration_number: Option<String>,

    /// Whether the vehicle can currently be booked
    pub available: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Validate vehicle configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Vehicle name cannot be empty".to_string());
        }

        if self.seating_capacity <= 0 {
            return Err("Seating capacity must be greater than zero".to_string());
        }

        self.pricing.validate()?;

        if self.security_deposit < Decimal::ZERO {
            return Err("Security deposit cannot be negative".to_string());
        }

        if self.driver_charges_per_day < Decimal::ZERO {
            return Err("Driver charges cannot be negative".to_string());
        }

        if !self.driver_available && self.driver_charges_per_day > Decimal::ZERO {
            return Err("Driver charges require driver availability".to_string());
        }

        Ok(())
    }

    /// Effective deposit: configured amount, or the tier default when unset
    pub fn effective_deposit(&self) -> Decimal {
        if self.security_deposit > Decimal::ZERO {
            self.security_deposit
        } else {
            self.tier.default_deposit()
        }
    }
}

impl Default for Vehicle {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            model: String::new(),
            brand: String::new(),
            year: 0,
            tier: VehicleTier::Normal,
            gear_type: GearType::Manual,
            fuel_type: FuelType::Petrol,
            seating_capacity: 5,
            pricing: PriceTable::default(),
            security_deposit: Decimal::ZERO,
            driver_available: false,
            driver_charges_per_day: Decimal::ZERO,
            description: None,
            features: Vec::new(),
            image_url: None,
            registration_number: None,
            available: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_table() -> PriceTable {
        PriceTable {
            price_12hr: dec!(1500),
            price_24hr: dec!(2500),
            price_36hr: dec!(3400),
            price_48hr: dec!(4200),
            price_60hr: dec!(5000),
            price_72hr: dec!(5700),
        }
    }

    #[test]
    fn test_tier_price_lookup() {
        let table = test_table();
        assert_eq!(table.tier_price(12), Some(dec!(1500)));
        assert_eq!(table.tier_price(72), Some(dec!(5700)));
        assert_eq!(table.tier_price(84), None);
        assert_eq!(table.tier_price(0), None);
    }

    #[test]
    fn test_price_table_monotonic() {
        assert!(test_table().validate().is_ok());

        let mut table = test_table();
        table.price_48hr = dec!(3000); // below the 36hr price
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_price_table_rejects_negative() {
        let mut table = test_table();
        table.price_12hr = dec!(-1);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_tier_default_deposit() {
        assert_eq!(VehicleTier::Normal.default_deposit(), dec!(20000));
        assert_eq!(VehicleTier::Premium.default_deposit(), dec!(35000));
        assert_eq!(VehicleTier::Luxury.default_deposit(), dec!(35000));
    }

    #[test]
    fn test_effective_deposit_falls_back_to_tier() {
        let vehicle = Vehicle {
            tier: VehicleTier::Luxury,
            security_deposit: Decimal::ZERO,
            ..Default::default()
        };
        assert_eq!(vehicle.effective_deposit(), dec!(35000));

        let configured = Vehicle {
            tier: VehicleTier::Luxury,
            security_deposit: dec!(50000),
            ..Default::default()
        };
        assert_eq!(configured.effective_deposit(), dec!(50000));
    }

    #[test]
    fn test_vehicle_validate_driver_charges() {
        let vehicle = Vehicle {
            name: "Swift".to_string(),
            pricing: test_table(),
            driver_available: false,
            driver_charges_per_day: dec!(500),
            ..Default::default()
        };
        assert!(vehicle.validate().is_err());
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!(VehicleTier::from_str("Premium"), Some(VehicleTier::Premium));
        assert_eq!(VehicleTier::from_str("luxury"), Some(VehicleTier::Luxury));
        assert_eq!(VehicleTier::from_str("sport"), None);
    }
}
