//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payment: PaymentConfig,
    pub storage: StorageConfig,
    pub booking: BookingConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Allowed CORS origin for the web client
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Authentication configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT token expiration in minutes
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_minutes: i64,
}

fn default_jwt_expiration() -> i64 {
    1440 // 24 hours
}

/// Payment gateway configuration (Razorpay)
#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    /// Gateway key ID, sent to the client for checkout
    pub key_id: String,

    /// Gateway key secret, used for order creation and signature checks
    pub key_secret: String,

    /// ISO currency code for orders
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Gateway API base URL
    #[serde(default = "default_gateway_url")]
    pub api_base_url: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_gateway_url() -> String {
    "https://api.razorpay.com/v1".to_string()
}

/// Document storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory uploaded documents are written to
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Public URL prefix documents are served under
    #[serde(default = "default_public_base")]
    pub public_base_url: String,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_public_base() -> String {
    "/uploads".to_string()
}

fn default_max_upload() -> usize {
    5 * 1024 * 1024
}

/// Booking-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    /// Maximum bookable duration in hours
    #[serde(default = "default_max_duration")]
    pub max_duration_hours: i32,

    /// Maximum home-delivery distance in kilometres
    #[serde(default = "default_max_delivery_km")]
    pub max_delivery_distance_km: i32,
}

fn default_max_duration() -> i32 {
    168 // one week
}

fn default_max_delivery_km() -> i32 {
    100
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.cors_origin", "http://localhost:3000")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("auth.jwt_expiration_minutes", 1440)?
            .set_default("payment.currency", "INR")?
            .set_default("payment.api_base_url", "https://api.razorpay.com/v1")?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.public_base_url", "/uploads")?
            .set_default("storage.max_upload_bytes", 5 * 1024 * 1024)?
            .set_default("booking.max_duration_hours", 168)?
            .set_default("booking.max_delivery_distance_km", 100)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with RENTWHEELS_ prefix
            .add_source(
                Environment::with_prefix("RENTWHEELS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("RENTWHEELS").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_duration_hours: 168,
            max_delivery_distance_km: 100,
        }
    }
}
