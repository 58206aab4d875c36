//! Environment-based Configuration
//!
//! All settings load from environment variables with development defaults.
//! Secrets never come from hardcoded values in production deployments.
//!
//! # Environment Variables
//!
//! - `MERCHSTORE_PORT` - REST API port (default: 8080)
//! - `MERCHSTORE_DB_PATH` - SQLite database path (default: "data/merchstore.db")
//! - `MERCHSTORE_JWT_SECRET` - HS256 signing secret (dev default with warning)
//! - `MERCHSTORE_JWT_TTL_MIN` - Session token lifetime in minutes (default: 60)
//! - `MERCHSTORE_CACHE_TTL_MIN` - Auth cache entry lifetime in minutes (default: 10)
//! - `MERCHSTORE_STARTING_BALANCE` - Coins granted at signup (default: 1000)
//! - `MERCHSTORE_LOG_LEVEL` - Logging level (default: "info")
//! - `MERCHSTORE_LOG_JSON` - Set to "1" for JSON log output

use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// REST API port
    pub port: u16,

    /// SQLite database path
    pub db_path: String,

    /// Session token signing secret
    pub jwt_secret: String,

    /// Session token lifetime in minutes
    pub token_ttl_minutes: i64,

    /// Auth cache entry lifetime in minutes
    pub cache_ttl_minutes: u64,

    /// Coins granted to a freshly provisioned account
    pub starting_balance: i64,

    /// Log level
    pub log_level: String,

    /// Whether to emit JSON logs
    pub log_json: bool,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_or("MERCHSTORE_PORT", 8080)?;

        let db_path =
            env::var("MERCHSTORE_DB_PATH").unwrap_or_else(|_| "data/merchstore.db".to_string());

        let jwt_secret = env::var("MERCHSTORE_JWT_SECRET").unwrap_or_else(|_| {
            eprintln!(
                "WARNING: MERCHSTORE_JWT_SECRET not set - using built-in dev secret, \
                 DO NOT USE IN PRODUCTION"
            );
            "merchstore-dev-secret".to_string()
        });

        let token_ttl_minutes = parse_or("MERCHSTORE_JWT_TTL_MIN", 60)?;
        let cache_ttl_minutes = parse_or("MERCHSTORE_CACHE_TTL_MIN", 10)?;
        let starting_balance = parse_or("MERCHSTORE_STARTING_BALANCE", 1000)?;

        let log_level = env::var("MERCHSTORE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = env::var("MERCHSTORE_LOG_JSON").map(|v| v == "1").unwrap_or(false);

        Ok(Self {
            port,
            db_path,
            jwt_secret,
            token_ttl_minutes,
            cache_ttl_minutes,
            starting_balance,
            log_level,
            log_json,
        })
    }

    /// Print configuration summary (hiding sensitive values)
    pub fn print_summary(&self) {
        println!("=== Merchstore Configuration ===");
        println!("Port: {}", self.port);
        println!("Database: {}", self.db_path);
        println!("Token TTL: {} min", self.token_ttl_minutes);
        println!("Auth Cache TTL: {} min", self.cache_ttl_minutes);
        println!("Starting Balance: {} coins", self.starting_balance);
        println!("Log Level: {}", self.log_level);
        println!("================================");
    }
}

/// Parse an env var into `T`, or fall back to `default` when unset.
fn parse_or<T: std::str::FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var_name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var_name.to_string(), value)),
        Err(_) => Ok(default),
    }
}
