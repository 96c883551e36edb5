//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use grove_infra::{DatabaseConfig, JwtConfig, KvsConfig};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Grace period for in-flight requests on shutdown.
    pub shutdown_timeout: Duration,
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations at startup.
    pub auto_migrate: bool,
    pub kvs: KvsConfig,
    pub auth: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let shutdown_timeout = match lookup("SHUTDOWN_TIMEOUT") {
            None => DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    default = DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                    "SHUTDOWN_TIMEOUT is invalid, using default"
                );
                DEFAULT_SHUTDOWN_TIMEOUT_SECS
            }),
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            shutdown_timeout: Duration::from_secs(shutdown_timeout),
            database: DatabaseConfig::from_lookup(&lookup),
            auto_migrate: lookup("DB_AUTO_MIGRATE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            kvs: KvsConfig::from_lookup(&lookup),
            auth: JwtConfig::from_lookup(&lookup),
        }
    }
}

/// Load variables from `ENV_FILE` (default `.env`) if it exists.
///
/// Runs before logging is set up, so failures are returned for the caller to report.
pub fn load_env_file() -> Result<Option<String>, String> {
    let path = env::var("ENV_FILE").unwrap_or_else(|_| ".env".to_string());
    match dotenvy::from_filename(&path) {
        Ok(_) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(format!("failed to load {path}: {e}")),
    }
}
