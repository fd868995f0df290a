//! Pricing engine
//!
//! Rental prices come from the vehicle's fixed six-tier table for durations
//! up to 72 hours. Longer rentals extend at the 24-hour rate, billed per
//! started day. Driver charges are per started day on top of the rental
//! price. Late returns are billed in 12-hour blocks at the 12-hour rate.
//!
//! All amounts are `Decimal`; nothing here rounds or truncates.

use rust_decimal::Decimal;

use crate::error::AppError;
use crate::models::vehicle::{PriceTable, Vehicle};
use crate::AppResult;

/// The six canonical rental duration tiers, in hours
pub const DURATION_TIERS: [i32; 6] = [12, 24, 36, 48, 60, 72];

/// Hours covered by one billed day
const HOURS_PER_DAY: i32 = 24;

/// Hours covered by one late block
const LATE_BLOCK_HOURS: i32 = 12;

/// Check that a requested duration is bookable: a positive multiple of 12
pub fn validate_duration(duration_hours: i32) -> AppResult<()> {
    if duration_hours <= 0 || duration_hours % 12 != 0 {
        return Err(AppError::InvalidDuration(duration_hours));
    }
    Ok(())
}

/// Days billed for a duration, rounding any started day up
pub fn billable_days(duration_hours: i32) -> i32 {
    (duration_hours + HOURS_PER_DAY - 1) / HOURS_PER_DAY
}

/// Base rental price for a duration from a price table
///
/// Durations at or below 72 hours must hit one of the six tiers exactly.
/// Longer durations are billed as started days at the 24-hour rate.
pub fn rental_price(pricing: &PriceTable, duration_hours: i32) -> AppResult<Decimal> {
    validate_duration(duration_hours)?;

    if let Some(price) = pricing.tier_price(duration_hours) {
        return Ok(price);
    }

    if duration_hours < DURATION_TIERS[DURATION_TIERS.len() - 1] {
        // Unreachable for valid multiples of 12 up to 72, but kept as a
        // guard should the tier list ever change.
        return Err(AppError::InvalidDuration(duration_hours));
    }

    let days = Decimal::from(billable_days(duration_hours));
    Ok(pricing.price_24hr * days)
}

/// Driver charges: per-day rate times started days
pub fn driver_charges(per_day: Decimal, duration_hours: i32) -> Decimal {
    per_day * Decimal::from(billable_days(duration_hours))
}

/// Total quoted price for a vehicle, duration and driver option
pub fn quote(vehicle: &Vehicle, duration_hours: i32, with_driver: bool) -> AppResult<Decimal> {
    let base = rental_price(&vehicle.pricing, duration_hours)?;

    if !with_driver {
        return Ok(base);
    }

    if !vehicle.driver_available {
        return Err(AppError::validation_field(
            "withDriver",
            "Driver is not available for this vehicle",
        ));
    }

    Ok(base + driver_charges(vehicle.driver_charges_per_day, duration_hours))
}

/// Late-return fee: each started 12-hour block past the scheduled end is
/// billed at the vehicle's 12-hour rate. Zero late hours means zero fee.
pub fn late_charges(pricing: &PriceTable, late_hours: i32) -> Decimal {
    if late_hours <= 0 {
        return Decimal::ZERO;
    }
    let blocks = (late_hours + LATE_BLOCK_HOURS - 1) / LATE_BLOCK_HOURS;
    pricing.price_12hr * Decimal::from(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn table() -> PriceTable {
        PriceTable {
            price_12hr: dec!(6000),
            price_24hr: dec!(10000),
            price_36hr: dec!(13500),
            price_48hr: dec!(17000),
            price_60hr: dec!(20000),
            price_72hr: dec!(23000),
        }
    }

    #[test]
    fn test_tier_durations_use_table() {
        let t = table();
        assert_eq!(rental_price(&t, 12).unwrap(), dec!(6000));
        assert_eq!(rental_price(&t, 24).unwrap(), dec!(10000));
        assert_eq!(rental_price(&t, 72).unwrap(), dec!(23000));
    }

    #[test]
    fn test_extended_duration_bills_started_days() {
        let t = table();
        // 96 hours = 4 days at the 24-hour rate
        assert_eq!(rental_price(&t, 96).unwrap(), dec!(40000));
        // 84 hours still starts a fourth day
        assert_eq!(rental_price(&t, 84).unwrap(), dec!(40000));
        // 168 hours = 7 days
        assert_eq!(rental_price(&t, 168).unwrap(), dec!(70000));
    }

    #[test]
    fn test_invalid_durations_rejected() {
        let t = table();
        assert!(matches!(
            rental_price(&t, 0),
            Err(AppError::InvalidDuration(0))
        ));
        assert!(matches!(
            rental_price(&t, -12),
            Err(AppError::InvalidDuration(-12))
        ));
        assert!(matches!(
            rental_price(&t, 13),
            Err(AppError::InvalidDuration(13))
        ));
        assert!(matches!(
            rental_price(&t, 90),
            Err(AppError::InvalidDuration(90))
        ));
    }

    #[test]
    fn test_billable_days_rounds_up() {
        assert_eq!(billable_days(12), 1);
        assert_eq!(billable_days(24), 1);
        assert_eq!(billable_days(36), 2);
        assert_eq!(billable_days(48), 2);
        assert_eq!(billable_days(96), 4);
    }

    #[test]
    fn test_driver_charges_per_started_day() {
        assert_eq!(driver_charges(dec!(500), 24), dec!(500));
        assert_eq!(driver_charges(dec!(500), 36), dec!(1000));
        assert_eq!(driver_charges(dec!(500), 96), dec!(2000));
    }

    #[test]
    fn test_quote_with_driver() {
        let vehicle = Vehicle {
            pricing: table(),
            driver_available: true,
            driver_charges_per_day: dec!(500),
            ..Default::default()
        };
        // 24h at 10000 plus one driver day at 500
        assert_eq!(quote(&vehicle, 24, true).unwrap(), dec!(10500));
        assert_eq!(quote(&vehicle, 24, false).unwrap(), dec!(10000));
    }

    #[test]
    fn test_quote_rejects_driver_when_unavailable() {
        let vehicle = Vehicle {
            pricing: table(),
            driver_available: false,
            ..Default::default()
        };
        assert!(quote(&vehicle, 24, true).is_err());
    }

    #[test]
    fn test_late_charges_in_twelve_hour_blocks() {
        let t = table();
        assert_eq!(late_charges(&t, 0), Decimal::ZERO);
        assert_eq!(late_charges(&t, -3), Decimal::ZERO);
        // One started block
        assert_eq!(late_charges(&t, 1), dec!(6000));
        assert_eq!(late_charges(&t, 12), dec!(6000));
        // 15 hours late starts a second block
        assert_eq!(late_charges(&t, 15), dec!(12000));
        assert_eq!(late_charges(&t, 24), dec!(12000));
        assert_eq!(late_charges(&t, 25), dec!(18000));
    }
}
