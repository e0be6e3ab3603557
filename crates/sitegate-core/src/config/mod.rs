//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section has defaults so an empty file is valid.

pub mod app;
pub mod auth;
pub mod csrf;
pub mod database;
pub mod logging;
pub mod presence;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::csrf::CsrfConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::presence::{PresenceConfig, VisitorStoreKind};
pub use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides, e.g. `SITEGATE__AUTH__JWT_SECRET`.
const ENV_PREFIX: &str = "SITEGATE";

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration sources
/// (base file, optional environment overlay, environment variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Bearer token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// CSRF cookie and token settings.
    #[serde(default)]
    pub csrf: CsrfConfig,
    /// Visitor tracking settings.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Live connection hub settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a single file plus environment variables.
    ///
    /// The file is optional; missing sections fall back to defaults.
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::build(path, None)
    }

    /// Load configuration from a base file, an environment overlay
    /// (`config/{env}.toml`) and environment variables, in that order.
    pub fn load_with_env(path: &str, env: &str) -> Result<Self, AppError> {
        Self::build(path, Some(env))
    }

    fn build(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
