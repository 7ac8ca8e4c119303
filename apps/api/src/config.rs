//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first, if present.
//!
//! | Variable                        | Default          |
//! |---------------------------------|------------------|
//! | `PHARMOS_HOST`                  | `127.0.0.1`      |
//! | `PHARMOS_PORT`                  | `8080`           |
//! | `PHARMOS_DB_PATH`               | `./pharmos.db`   |
//! | `PHARMOS_DB_MAX_CONNECTIONS`    | `5`              |
//! | `JWT_SECRET`                    | dev secret       |
//! | `JWT_LIFETIME_SECS`             | `604800` (7 d)   |
//! | `PHARMOS_SALE_TIMEOUT_SECS`     | `10`             |
//! | `PHARMOS_LOW_STOCK_THRESHOLD`   | `5`              |
//! | `PHARMOS_EXPIRED_ON_EXPIRY_DAY` | `false`          |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pharmos_core::{StatusPolicy, DEFAULT_LOW_STOCK_THRESHOLD};
use pharmos_db::DbConfig;

/// Signing secret used when `JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "pharmos-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// SQLite database file
    pub db_path: PathBuf,
    pub db_max_connections: u32,

    /// Secret key for signing bearer tokens
    pub jwt_secret: String,

    /// Bearer token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Upper bound on one sale transaction
    pub sale_timeout: Duration,

    pub low_stock_threshold: i64,
    pub expired_on_expiry_day: bool,
}

impl ApiConfig {
    /// Load configuration from the environment (after reading `.env`).
    pub fn load() -> Result<Self, ConfigError> {
        accept_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ApiConfig {
            host: lookup("PHARMOS_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),

            port: parse_or(&lookup, "PHARMOS_PORT", 8080)?,

            db_path: lookup("PHARMOS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./pharmos.db")),

            db_max_connections: parse_or(&lookup, "PHARMOS_DB_MAX_CONNECTIONS", 5)?,

            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),

            jwt_lifetime_secs: parse_or(&lookup, "JWT_LIFETIME_SECS", 604_800)?,

            sale_timeout: Duration::from_secs(parse_or(&lookup, "PHARMOS_SALE_TIMEOUT_SECS", 10)?),

            low_stock_threshold: parse_or(
                &lookup,
                "PHARMOS_LOW_STOCK_THRESHOLD",
                DEFAULT_LOW_STOCK_THRESHOLD,
            )?,

            expired_on_expiry_day: parse_or(&lookup, "PHARMOS_EXPIRED_ON_EXPIRY_DAY", false)?,
        };

        if config.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("PHARMOS_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        if config.sale_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("PHARMOS_SALE_TIMEOUT_SECS".to_string()));
        }

        Ok(config)
    }

    /// Whether the development signing secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path)
            .max_connections(self.db_max_connections)
            .sale_timeout(self.sale_timeout)
    }

    pub fn status_policy(&self) -> StatusPolicy {
        StatusPolicy {
            low_stock_threshold: self.low_stock_threshold,
            expired_on_expiry_day: self.expired_on_expiry_day,
        }
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn accept_dotenv(result: Result<PathBuf, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded .env");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to read .env: {0}")]
    DotEnv(#[from] dotenvy::Error),
}
