//! Application identity and runtime environment.

use serde::{Deserialize, Serialize};

/// Runtime environment the process was deployed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development. Enables the guard debug surface.
    Development,
    /// Any deployed build. Used when nothing is configured.
    #[default]
    Production,
}

impl Environment {
    /// Whether development-only introspection is allowed.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// The `[app]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    /// Display name used in log lines.
    #[serde(default = "default_name")]
    pub name: String,
    /// Runtime environment.
    #[serde(default)]
    pub environment: Environment,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            environment: Environment::default(),
        }
    }
}

fn default_name() -> String {
    "moodkiosk".to_string()
}
