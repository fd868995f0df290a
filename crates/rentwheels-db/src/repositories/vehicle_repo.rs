//! Vehicle repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rentwheels_core::{
    models::{FuelType, GearType, PriceTable, Vehicle, VehicleTier},
    traits::{Repository, VehicleRepository},
    AppError, AppResult,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const VEHICLE_COLUMNS: &str = "id, name, model, brand, year, tier, gear_type, fuel_type, \
     seating_capacity, price_12hr, price_24hr, price_36hr, price_48hr, price_60hr, price_72hr, \
     security_deposit, driver_available, driver_charges_per_day, description, features, \
     image_url, registration_number, available, created_at, updated_at";

/// PostgreSQL implementation of VehicleRepository
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    /// Create a new vehicle repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Vehicle, Uuid> for PgVehicleRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        debug!("Finding vehicle by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding vehicle {}: {}", id, e);
            AppError::Database(format!("Failed to find vehicle: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Vehicle>> {
        let rows = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            "SELECT {} FROM vehicles ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            VEHICLE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding vehicles: {}", e);
            AppError::Database(format!("Failed to fetch vehicles: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting vehicles: {}", e);
                AppError::Database(format!("Failed to count vehicles: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Vehicle) -> AppResult<Vehicle> {
        debug!("Creating vehicle: {}", entity.name);

        let features = serde_json::to_value(&entity.features)?;

        let row = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            r#"
            INSERT INTO vehicles (
                id, name, model, brand, year, tier, gear_type, fuel_type,
                seating_capacity, price_12hr, price_24hr, price_36hr, price_48hr,
                price_60hr, price_72hr, security_deposit, driver_available,
                driver_charges_per_day, description, features, image_url,
                registration_number, available
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.model)
        .bind(&entity.brand)
        .bind(entity.year)
        .bind(entity.tier.to_string())
        .bind(entity.gear_type.to_string())
        .bind(entity.fuel_type.to_string())
        .bind(entity.seating_capacity)
        .bind(entity.pricing.price_12hr)
        .bind(entity.pricing.price_24hr)
        .bind(entity.pricing.price_36hr)
        .bind(entity.pricing.price_48hr)
        .bind(entity.pricing.price_60hr)
        .bind(entity.pricing.price_72hr)
        .bind(entity.security_deposit)
        .bind(entity.driver_available)
        .bind(entity.driver_charges_per_day)
        .bind(&entity.description)
        .bind(features)
        .bind(&entity.image_url)
        .bind(&entity.registration_number)
        .bind(entity.available)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating vehicle: {}", e);
            AppError::Database(format!("Failed to create vehicle: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Vehicle) -> AppResult<Vehicle> {
        debug!("Updating vehicle: {}", entity.id);

        let features = serde_json::to_value(&entity.features)?;

        let row = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            r#"
            UPDATE vehicles
            SET name = $2,
                model = $3,
                brand = $4,
                year = $5,
                tier = $6,
                gear_type = $7,
                fuel_type = $8,
                seating_capacity = $9,
                price_12hr = $10,
                price_24hr = $11,
                price_36hr = $12,
                price_48hr = $13,
                price_60hr = $14,
                price_72hr = $15,
                security_deposit = $16,
                driver_available = $17,
                driver_charges_per_day = $18,
                description = $19,
                features = $20,
                image_url = $21,
                registration_number = $22,
                available = $23,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(entity.id)
        .bind(&entity.name)
        .bind(&entity.model)
        .bind(&entity.brand)
        .bind(entity.year)
        .bind(entity.tier.to_string())
        .bind(entity.gear_type.to_string())
        .bind(entity.fuel_type.to_string())
        .bind(entity.seating_capacity)
        .bind(entity.pricing.price_12hr)
        .bind(entity.pricing.price_24hr)
        .bind(entity.pricing.price_36hr)
        .bind(entity.pricing.price_48hr)
        .bind(entity.pricing.price_60hr)
        .bind(entity.pricing.price_72hr)
        .bind(entity.security_deposit)
        .bind(entity.driver_available)
        .bind(entity.driver_charges_per_day)
        .bind(&entity.description)
        .bind(features)
        .bind(&entity.image_url)
        .bind(&entity.registration_number)
        .bind(entity.available)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating vehicle {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update vehicle: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error deleting vehicle {}: {}", id, e);
                AppError::Database(format!("Failed to delete vehicle: {}", e))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        available_only: bool,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Vehicle>, i64)> {
        debug!("Listing vehicles, available_only: {}", available_only);

        let where_clause = if available_only {
            "WHERE available = TRUE"
        } else {
            ""
        };

        let rows = sqlx::query_as::<sqlx::Postgres, VehicleRow>(&format!(
            "SELECT {} FROM vehicles {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            VEHICLE_COLUMNS, where_clause
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing vehicles: {}", e);
            AppError::Database(format!("Failed to list vehicles: {}", e))
        })?;

        let total: (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM vehicles {}", where_clause))
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting vehicles: {}", e);
                    AppError::Database(format!("Failed to count vehicles: {}", e))
                })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }

    #[instrument(skip(self))]
    async fn set_available(&self, id: Uuid, available: bool) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE vehicles SET available = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(available)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error updating vehicle availability: {}", e);
                    AppError::Database(format!("Failed to update availability: {}", e))
                })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    name: String,
    model: String,
    brand: String,
    year: i32,
    tier: String,
    gear_type: String,
    fuel_type: String,
    seating_capacity: i32,
    price_12hr: Decimal,
    price_24hr: Decimal,
    price_36hr: Decimal,
    price_48hr: Decimal,
    price_60hr: Decimal,
    price_72hr: Decimal,
    security_deposit: Decimal,
    driver_available: bool,
    driver_charges_per_day: Decimal,
    description: Option<String>,
    features: serde_json::Value,
    image_url: Option<String>,
    registration_number: Option<String>,
    available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        let features = serde_json::from_value(row.features).unwrap_or_default();

        Self {
            id: row.id,
            name: row.name,
            model: row.model,
            brand: row.brand,
            year: row.year,
            tier: VehicleTier::from_str(&row.tier).unwrap_or_default(),
            gear_type: GearType::from_str(&row.gear_type).unwrap_or_default(),
            fuel_type: FuelType::from_str(&row.fuel_type).unwrap_or_default(),
            seating_capacity: row.seating_capacity,
            pricing: PriceTable {
                price_12hr: row.price_12hr,
                price_24hr: row.price_24hr,
                price_36hr: row.price_36hr,
                price_48hr: row.price_48hr,
                price_60hr: row.price_60hr,
                price_72hr: row.price_72hr,
            },
            security_deposit: row.security_deposit,
            driver_available: row.driver_available,
            driver_charges_per_day: row.driver_charges_per_day,
            description: row.description,
            features,
            image_url: row.image_url,
            registration_number: row.registration_number,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
