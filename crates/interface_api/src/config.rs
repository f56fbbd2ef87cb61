//! API configuration

use serde::Deserialize;

use core_kernel::{TemporalError, Timezone};
use domain_ledger::DEFAULT_MAX_ATTEMPTS;

/// Port used when neither `API_PORT` nor `PORT` is set
pub const DEFAULT_PORT: u16 = 5050;

/// Which `DocumentStore` adapter backs the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    Postgres,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    pub store: StoreKind,
    /// Database URL, used when `store` is `postgres`
    pub database_url: String,
    /// IANA name of the reporting timezone
    pub timezone: String,
    /// Optimistic retry budget per ledger update
    pub max_update_attempts: u32,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            store: StoreKind::Memory,
            database_url: "postgres://localhost/collections".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            max_update_attempts: DEFAULT_MAX_ATTEMPTS,
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    ///
    /// Unset fields take their defaults; the port also honours a bare `PORT`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("port", i64::from(platform_port()))?
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolves the configured reporting timezone
    pub fn reporting_timezone(&self) -> Result<Timezone, TemporalError> {
        Timezone::from_name(&self.timezone)
    }
}

/// `PORT` as set by the hosting platform, else `DEFAULT_PORT`
pub fn platform_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
