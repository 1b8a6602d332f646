//! Application configuration loaded from environment.

use std::fmt;
use std::net::SocketAddr;

use chrono::Duration;
use sqlx::postgres::PgConnectOptions;

/// Database every PostgreSQL server ships with; used before the target database exists.
const MAINTENANCE_DATABASE: &str = "postgres";
const DEV_ENV_FILE: &str = ".env.development";
const MIN_JWT_SECRET_LEN: usize = 32;
/// Ten years.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Application configuration loaded from `.env` and environment variables.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (e.g. `0.0.0.0:8080`).
    pub server_addr: SocketAddr,
    pub database: DatabaseConfig,
    /// JWT signing secret (min 32 chars).
    pub jwt_secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl: Duration,
    /// Allowed browser origin for the frontend. `None` allows any origin.
    pub cors_origin: Option<String>,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Value of `APP_ENV`, if set.
    pub app_env: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("database", &self.database)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("cors_origin", &self.cors_origin)
            .field("log_level", &self.log_level)
            .field("app_env", &self.app_env)
            .finish()
    }
}

/// PostgreSQL server coordinates and target database name.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

impl DatabaseConfig {
    /// Options for reaching the server before the target database is known to exist.
    pub fn server_options(&self) -> PgConnectOptions {
        self.base_options().database(MAINTENANCE_DATABASE)
    }

    /// Options for the target database itself.
    pub fn database_options(&self) -> PgConnectOptions {
        self.base_options().database(&self.name)
    }

    fn base_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
    }
}

impl Config {
    /// Load configuration from the process environment. Call [`load_env_files`] before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_addr: SocketAddr = var("SERVER_ADDR", "0.0.0.0:8080")
            .parse()
            .map_err(|_| ConfigLoadError::InvalidServerAddr)?;

        let host = lookup("DB_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("DB_PORT", "5432")
            .parse::<u16>()
            .map_err(|_| ConfigLoadError::InvalidDbPort)?;
        let database = DatabaseConfig {
            host,
            port,
            user: var("DB_USER", "postgres"),
            password: var("DB_PASSWORD", ""),
            name: var("DB_NAME", "scoreboard"),
        };

        let jwt_secret = var(
            "JWT_SECRET",
            "scoreboard_jwt_secret_change_in_production_32chars",
        );
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigLoadError::WeakJwtSecret(MIN_JWT_SECRET_LEN));
        }

        let ttl_hours = var("JWT_TTL_HOURS", "24")
            .parse::<i64>()
            .ok()
            .filter(|h| (1..=MAX_TOKEN_TTL_HOURS).contains(h))
            .ok_or(ConfigLoadError::InvalidTokenTtl)?;

        let cors_origin = lookup("CORS_ORIGIN").filter(|o| !o.trim().is_empty());

        Ok(Self {
            server_addr,
            database,
            jwt_secret,
            token_ttl: Duration::hours(ttl_hours),
            cors_origin,
            log_level: var("LOG_LEVEL", "info"),
            app_env: lookup("APP_ENV"),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env.as_deref() == Some("development")
    }
}

/// Load `.env`, then `.env.development` on top of it when `APP_ENV=development`.
pub fn load_env_files() -> Result<(), ConfigLoadError> {
    dotenvy::dotenv().ok();
    if std::env::var("APP_ENV").as_deref() == Ok("development") {
        dotenvy::from_filename_override(DEV_ENV_FILE)
            .map_err(|e| ConfigLoadError::EnvFile(DEV_ENV_FILE, e.to_string()))?;
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Invalid SERVER_ADDR")]
    InvalidServerAddr,
    #[error("Invalid DB_PORT")]
    InvalidDbPort,
    #[error("JWT_TTL_HOURS must be between 1 and {} hours", MAX_TOKEN_TTL_HOURS)]
    InvalidTokenTtl,
    #[error("JWT_SECRET must be at least {0} characters")]
    WeakJwtSecret(usize),
    #[error("Failed to load {0}: {1}")]
    EnvFile(&'static str, String),
}
