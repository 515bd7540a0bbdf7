//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML via the `config`
//! crate. Each sub-module represents a logical configuration section.

pub mod access;
pub mod app;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::access::AccessConfig;
pub use self::app::{AppSection, Environment};
pub use self::logging::LoggingConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Root application configuration.
///
/// Every section carries serde defaults, so a missing file still yields a
/// usable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application identity and runtime environment.
    #[serde(default)]
    pub app: AppSection,
    /// Access guard and permission table settings.
    #[serde(default)]
    pub access: AccessConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional. Values are overlaid with environment variables
    /// prefixed with `MOODKIOSK__`, e.g. `MOODKIOSK__APP__ENVIRONMENT=production`.
    pub fn load(path: &str) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("MOODKIOSK")
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
