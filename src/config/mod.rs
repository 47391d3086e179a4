//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod auth;
mod server;
mod store;

pub use auth::AuthConfig;
pub use server::ServerConfig;
pub use store::StoreConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "PAVILION_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "PAVILION";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "PAVILION_LOG";

use serde::Deserialize;

/// Configuration validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required setting was absent or empty.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Key-value store configuration.
    pub store: StoreConfig,
    /// Admin authentication configuration.
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `PAVILION_CONFIG` environment variable (if set)
    /// 4. Environment variables with `PAVILION__` prefix
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new("config", FileFormat::Yaml).required(false))
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        Ok(config)
    }

    /// Check the settings the server cannot run without.
    ///
    /// The store region and the JWT secret have no usable defaults; failing
    /// here keeps a misconfigured process from serving unverifiable admin
    /// routes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.region.trim().is_empty() {
            return Err(ConfigError::Missing("store.region"));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("auth.jwt_secret"));
        }
        Ok(())
    }
}
