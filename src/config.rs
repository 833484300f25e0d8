//! Application configuration loaded from the environment

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

/// Global pricing constants, threaded through the resolvers by reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Length of one weekly rate allocation
    pub days_in_week: u32,
    /// Length of one monthly rate allocation
    pub days_in_month: u32,
    /// Default renter-side fee (whole percent)
    pub service_fee: Decimal,
    /// Default owner-side fee (whole percent)
    pub owner_service_fee: Decimal,
    /// Longest booking that will be priced
    pub max_nights: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            days_in_week: 7,
            days_in_month: 30,
            service_fee: Decimal::from(12),
            owner_service_fee: Decimal::from(3),
            max_nights: 3650,
        }
    }
}

impl PricingConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            days_in_week: env_or("RESERVATION_DAYS_IN_WEEK", defaults.days_in_week)?,
            days_in_month: env_or("RESERVATION_DAYS_IN_MONTH", defaults.days_in_month)?,
            service_fee: env_or("SERVICE_FEE", defaults.service_fee)?,
            owner_service_fee: env_or("SERVICE_FEE_OWNER", defaults.owner_service_fee)?,
            max_nights: env_or("RESERVATION_MAX_NIGHTS", defaults.max_nights)?,
        };

        anyhow::ensure!(config.days_in_week > 0, "RESERVATION_DAYS_IN_WEEK must be positive");
        anyhow::ensure!(config.days_in_month > 0, "RESERVATION_DAYS_IN_MONTH must be positive");
        anyhow::ensure!(config.max_nights > 0, "RESERVATION_MAX_NIGHTS must be positive");

        Ok(config)
    }
}

/// Server settings
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    /// Base URL of the booking manager API; discounts default to zero without it
    pub booking_manager_url: Option<String>,
    pub booking_manager_timeout: Duration,
    pub currency_base: String,
    /// `USD=1.08,GBP=0.85`
    pub currency_rates: String,
    pub pricing: PricingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5)?,
            booking_manager_url: env::var("BOOKING_MANAGER_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            booking_manager_timeout: Duration::from_millis(env_or(
                "BOOKING_MANAGER_TIMEOUT_MS",
                3_000u64,
            )?),
            currency_base: env::var("CURRENCY_BASE").unwrap_or_else(|_| "EUR".to_string()),
            currency_rates: env::var("CURRENCY_RATES").unwrap_or_default(),
            pricing: PricingConfig::from_env()?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
