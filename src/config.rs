// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::AppError;

/// Hard ceiling for any paginated listing.
pub const MAX_PAGE_LIMIT: i64 = 50;

/// Page size used when the caller leaves `limit` unset (or sends 0).
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Budget for single-row reads and writes.
pub const SHORT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Budget for multi-join listings.
pub const LONG_QUERY_TIMEOUT: Duration = Duration::from_secs(60);

/// How many of the newest bank questions a generated questionary pulls in.
pub const QUESTIONARY_SOURCE_LIMIT: i64 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        Ok(Self {
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_expiration: get_env_or("JWT_EXPIRATION", 86_400)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            server_port: get_env_or("SERVER_PORT", 8000)?,
            db_max_connections: get_env_or("DB_MAX_CONNECTIONS", 40)?,
            db_min_connections: get_env_or("DB_MIN_CONNECTIONS", 7)?,
        })
    }
}

fn get_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Config(format!("{} must be set", name)))
}

fn get_env_or<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
