//! Access guard and permission table configuration.

use serde::{Deserialize, Serialize};

/// The `[access]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Location a denied guard redirects to.
    #[serde(default = "default_unauthorized_path")]
    pub unauthorized_path: String,
    /// Location offered by the "Go Home" recovery action.
    #[serde(default = "default_home_path")]
    pub home_path: String,
    /// Delay before deny side effects (notice + redirect) are applied.
    #[serde(default)]
    pub redirect_delay_ms: u64,
    /// Whether a denial raises a user-visible notice.
    #[serde(default = "default_true")]
    pub notify_on_deny: bool,
    /// Optional JSON file replacing the compiled-in permission table.
    #[serde(default)]
    pub permissions_file: Option<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            unauthorized_path: default_unauthorized_path(),
            home_path: default_home_path(),
            redirect_delay_ms: 0,
            notify_on_deny: true,
            permissions_file: None,
        }
    }
}

fn default_unauthorized_path() -> String {
    "/unauthorized".to_string()
}

fn default_home_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}
