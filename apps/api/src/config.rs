//! API configuration module.
//!
//! Configuration is layered, later sources overriding earlier ones:
//!
//! ```text
//! built-in defaults  →  agrirent.toml (optional)  →  AGRIRENT_* env vars
//! ```
//!
//! e.g. `AGRIRENT_HTTP_PORT=9000` overrides `http_port`.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Secret used when none is configured. Fine for local development only.
const DEV_JWT_SECRET: &str = "agrirent-dev-secret-change-in-production";

/// HTTP service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub http_host: String,

    /// HTTP port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// Directory that holds uploaded tool images and handover proofs
    pub media_root: String,

    /// JWT secret key for signing session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Largest accepted request body in bytes (uploads included)
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_host: "0.0.0.0".to_string(),
            http_port: 8000,
            database_path: "agrirent.db".to_string(),
            db_max_connections: 5,
            media_root: "media".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_lifetime_secs: 86_400, // 1 day
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    /// Load configuration from defaults, `agrirent.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = Config::builder()
            .set_default("http_host", defaults.http_host)?
            .set_default("http_port", i64::from(defaults.http_port))?
            .set_default("database_path", defaults.database_path)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("media_root", defaults.media_root)?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_lifetime_secs", defaults.jwt_lifetime_secs)?
            .set_default("max_upload_bytes", defaults.max_upload_bytes as i64)?
            .add_source(File::with_name("agrirent").required(false))
            .add_source(Environment::with_prefix("AGRIRENT").try_parsing(true))
            .build()?;

        let api_config: ApiConfig = config.try_deserialize()?;
        api_config.validate()?;

        if api_config.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("AGRIRENT_JWT_SECRET not set, using the development secret");
        }

        Ok(api_config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_port == 0 {
            return Err(ConfigError::InvalidValue("http_port".to_string()));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_lifetime_secs".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("db_max_connections".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue("max_upload_bytes".to_string()));
        }
        if self.media_root.trim().is_empty() {
            return Err(ConfigError::MissingRequired("media_root".to_string()));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
