use std::env;

use thiserror::Error;

/// Which document-store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL via sqlx; the production backend.
    Postgres,
    /// In-memory store for local development, in place of an emulator.
    Memory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for environment variable {0}")]
    Invalid(&'static str),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// Document-store backend selector.
    pub store_backend: StoreBackend,
    /// PostgreSQL connection URL; required for the postgres backend.
    pub database_url: Option<String>,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// Secret the external token issuer signs access tokens with.
    pub jwt_secret: String,
    /// Shared secret gating the admin-claim endpoint. No default: the
    /// process refuses to start without it.
    pub admin_secret: String,
    /// Reject a waitlist signup whose email is already registered.
    pub waitlist_dedup: bool,
    /// Cap on request body size in bytes.
    pub max_body_bytes: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible
    /// defaults. `ADMIN_SECRET` has no default on purpose.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("postgres") => StoreBackend::Postgres,
            Err(_) => StoreBackend::Postgres,
            Ok(_) => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8080)?,
            store_backend,
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 20)?,
            db_min_connections: parse_var("DB_MIN_CONNECTIONS", 5)?,
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me-in-production".to_string()),
            admin_secret: env::var("ADMIN_SECRET")
                .map_err(|_| ConfigError::Missing("ADMIN_SECRET"))?,
            waitlist_dedup: parse_var("WAITLIST_DEDUP", false)?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", 1024 * 1024)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}
