//! Configuration loader for the `home-monitor` backend service.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). Consolidating configuration logic here
//! avoids scattering `env::var` calls throughout the codebase.

use std::env;

use anyhow::{anyhow, Result};
use ipnet::IpNet;

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Database connection string, e.g. `sqlite://monitor.db`.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Networks allowed through the IP filter, in addition to loopback.
    pub allowed_networks: Vec<IpNet>,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – database connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `ALLOWED_NETWORKS` – comma-separated CIDR networks admitted by the
///   IP filter (default: loopback only)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);

    let allowed_networks = match env::var("ALLOWED_NETWORKS") {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<IpNet>()
                    .map_err(|e| anyhow!("Invalid ALLOWED_NETWORKS entry '{}': {}", s, e))
            })
            .collect::<Result<Vec<_>>>()?,
        Err(_) => Vec::new(),
    };

    Ok(Config {
        db_url,
        db_pool_max,
        allowed_networks,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks credentials embedded in the database URL while showing all
    /// configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        // Mask any password in the database URL
        let masked_db_url = if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                )
            } else {
                self.db_url.clone()
            }
        } else {
            self.db_url.clone()
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL     : {}", masked_db_url);
        tracing::info!("  DB_POOL_MAX      : {}", self.db_pool_max);
        tracing::info!("  ALLOWED_NETWORKS : {:?}", self.allowed_networks);
    }
}
