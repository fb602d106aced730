use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

/// Runtime settings, read once from the environment at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of pooled database connections
    pub database_max_connections: u32,

    /// Interface the HTTP server binds to
    pub host: String,

    /// Port the HTTP server binds to
    pub port: u16,

    /// HMAC secret used to sign session tokens
    pub jwt_secret: String,

    /// Lifetime of a session token, in hours
    pub session_ttl_hours: i64,

    /// Append the underlying database error to persistence failure messages
    pub expose_error_detail: bool,

    /// Mark the session cookie `Secure`
    pub session_cookie_secure: bool,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// Call `dotenv().ok()` first if a `.env` file should be honored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10)?,
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("SERVER_PORT", 3000)?,
            jwt_secret: required("JWT_SECRET")?,
            session_ttl_hours: parsed("SESSION_TTL_HOURS", 24)?,
            expose_error_detail: flag("EXPOSE_ERROR_DETAIL", false)?,
            session_cookie_secure: flag("SESSION_COOKIE_SECURE", true)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_flag(&value).ok_or(ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
