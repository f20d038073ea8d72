//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod dispatch;
pub mod email;
pub mod logging;
pub mod push;
pub mod social;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::dispatch::DispatchConfig;
pub use self::email::{EmailConfig, EmailHeadlines};
pub use self::logging::LoggingConfig;
pub use self::push::{PushConfig, PushKindConfig};
pub use self::social::{InstagramConfig, SocialConfig, TwitterConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Scheduler and runner settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// SMTP email channel.
    #[serde(default)]
    pub email: EmailConfig,
    /// Firebase push channel.
    #[serde(default)]
    pub push: PushConfig,
    /// Twitter and Instagram publishing.
    #[serde(default)]
    pub social: SocialConfig,
}

impl AppConfig {
    /// Load configuration from the `config/` directory.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `BENEFICH__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(Path::new("config"), env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &Path, env: &str) -> Result<Self, AppError> {
        let default_path = dir.join("default").to_string_lossy().into_owned();
        let env_path = dir.join(env).to_string_lossy().into_owned();

        let config = config::Config::builder()
            .add_source(config::File::with_name(&default_path).required(false))
            .add_source(config::File::with_name(&env_path).required(false))
            .add_source(
                config::Environment::with_prefix("BENEFICH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every enabled channel carries the settings it needs.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::configuration("database.url is required"));
        }
        if self.dispatch.attempt_timeout_seconds == 0 {
            return Err(AppError::configuration(
                "dispatch.attempt_timeout_seconds must be positive",
            ));
        }
        self.email.validate()?;
        self.push.validate()?;
        self.social.validate()?;
        Ok(())
    }
}

/// Fail with a configuration error when an enabled channel lacks `value`.
pub(crate) fn require(section: &str, field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::configuration(format!(
            "{section}.{field} is required when {section} is enabled"
        )));
    }
    Ok(())
}
