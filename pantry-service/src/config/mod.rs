//! Configuration module for pantry-service.

use crate::models::DEFAULT_DRAFT_TTL_MINUTES;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

pub const ENTRIES_FILE: &str = "entries.csv";
pub const RATES_FILE: &str = "rates.csv";

#[derive(Debug, Clone)]
pub struct PantryConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
    pub draft_ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub password: Secret<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Directory holding the CSV sheets. In-memory sheets when unset.
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn entries_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(ENTRIES_FILE))
    }

    pub fn rates_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(RATES_FILE))
    }
}

impl PantryConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let password = env::var("PANTRY_ADMIN_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("PANTRY_ADMIN_PASSWORD is required"))
            })?;

        let draft_ttl_minutes = match env::var("PANTRY_DRAFT_TTL_MINUTES") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "PANTRY_DRAFT_TTL_MINUTES must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
            Err(_) => DEFAULT_DRAFT_TTL_MINUTES,
        };

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "pantry-service".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
            admin: AdminConfig {
                password: Secret::new(password),
            },
            storage: StorageConfig {
                data_dir: env::var("PANTRY_DATA_DIR")
                    .ok()
                    .filter(|d| !d.is_empty())
                    .map(PathBuf::from),
            },
            draft_ttl_minutes,
        })
    }

    /// Draft lifetime as a duration.
    pub fn draft_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.draft_ttl_minutes)
    }
}
