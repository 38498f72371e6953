use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::core_types::{HotelId, RoomId, UserId};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub booking: BookingServiceConfig,
    pub payment: PaymentServiceConfig,
}

/// Which store backs a service
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingServiceConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// Interval of the availability-flag sweep; 0 disables it
    #[serde(default = "default_sweep_secs")]
    pub availability_sweep_secs: u64,
    /// Fixture data loaded into the memory store at startup
    #[serde(default)]
    pub seed: InventorySeed,
}

fn default_sweep_secs() -> u64 {
    3600
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct InventorySeed {
    #[serde(default)]
    pub users: Vec<UserId>,
    #[serde(default)]
    pub rooms: Vec<RoomSeed>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RoomSeed {
    pub room_id: RoomId,
    pub hotel_id: HotelId,
    pub room_number: String,
    pub room_type: String,
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentServiceConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    pub gateway: GatewayConfig,
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Public key identifier, handed to clients
    pub key_id: String,
    /// Shared secret for order auth and payment signatures
    pub key_secret: String,
    /// Secret for webhook body signatures (separate from `key_secret`)
    pub webhook_secret: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_minor_unit_factor")]
    pub minor_unit_factor: u32,
    /// Mint orders in-process instead of calling `base_url`
    #[serde(default)]
    pub sandbox: bool,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_minor_unit_factor() -> u32 {
    crate::money::DEFAULT_MINOR_UNIT_FACTOR
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let factor = self.payment.gateway.minor_unit_factor;
        anyhow::ensure!(
            crate::money::SUPPORTED_MINOR_UNIT_FACTORS.contains(&factor),
            "payment.gateway.minor_unit_factor must be one of {:?}, got {}",
            crate::money::SUPPORTED_MINOR_UNIT_FACTORS,
            factor
        );
        Ok(())
    }

    /// Secrets and database URLs may come from the environment instead of YAML.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("STAYLINE_GATEWAY_KEY_SECRET") {
            self.payment.gateway.key_secret = v;
        }
        if let Some(v) = lookup("STAYLINE_WEBHOOK_SECRET") {
            self.payment.gateway.webhook_secret = v;
        }
        if let Some(v) = lookup("STAYLINE_BOOKING_DATABASE_URL") {
            self.booking.postgres_url = Some(v);
        }
        if let Some(v) = lookup("STAYLINE_PAYMENT_DATABASE_URL") {
            self.payment.postgres_url = Some(v);
        }
    }
}
