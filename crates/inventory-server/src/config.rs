//! Configuration loading
//!
//! Sources, lowest precedence first: built-in defaults, the optional TOML
//! file, then `INVENTORY__<SECTION>__<KEY>` environment variables. Command
//! line flags are applied on top by `main`.

use anyhow::{Context, Result};
use inventory_db::PoolSettings;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Environment variable prefix, e.g. `INVENTORY__DATABASE__URL`
const ENV_PREFIX: &str = "INVENTORY";
const ENV_SEPARATOR: &str = "__";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Browser origin allowed by CORS
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a request may wait for a pooled connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }
}

/// Authentication configuration
///
/// There is no default secret; startup fails without one.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_allowed_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_db_url() -> String {
    "sqlite:./data/inventario.db".to_string()
}

fn default_max_connections() -> u32 {
    PoolSettings::default().max_connections
}

fn default_acquire_timeout_secs() -> u64 {
    PoolSettings::default().acquire_timeout.as_secs()
}

fn default_token_ttl_hours() -> i64 {
    inventory_auth::TOKEN_TTL_HOURS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from the optional file and the environment
    pub fn load(path: &str) -> Result<Self> {
        let file_present = Path::new(path).exists();

        let config: Config = ::config::Config::builder()
            .add_source(
                ::config::File::new(path, ::config::FileFormat::Toml).required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration (file: {})", path))?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        if file_present {
            info!("Loaded configuration from {}", path);
        } else {
            info!("Config file not found at {}, using defaults and environment", path);
        }

        Ok(config)
    }
}
