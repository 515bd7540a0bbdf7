//! Deny policies and the user-facing content of loading and denied states.

use serde::Serialize;

use moodkiosk_core::config::AccessConfig;

/// Shown while the guard waits for identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadingIndicator {
    /// Text next to the spinner.
    pub message: String,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self {
            message: "Checking access...".to_string(),
        }
    }
}

/// The notice raised once when access is denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialNotice {
    /// Short headline.
    pub title: String,
    /// Explanation shown under the headline.
    pub description: String,
}

impl Default for DenialNotice {
    fn default() -> Self {
        Self {
            title: "Access Denied".to_string(),
            description: "You don't have permission to access this page.".to_string(),
        }
    }
}

/// A way out of a denied screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecoveryAction {
    /// Return to the previous location.
    GoBack,
    /// Navigate to the home location.
    GoHome {
        /// Home location.
        path: String,
    },
}

impl RecoveryAction {
    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GoBack => "Go Back",
            Self::GoHome { .. } => "Go Home",
        }
    }
}

/// Content of a denied state: an explanation and a path back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeniedScreen {
    /// Headline.
    pub title: String,
    /// Explanation.
    pub message: String,
    /// Recovery actions, in display order.
    pub actions: Vec<RecoveryAction>,
}

impl DeniedScreen {
    /// The standard screen with "Go Back" and "Go Home" actions.
    pub fn standard(home_path: impl Into<String>) -> Self {
        let notice = DenialNotice::default();
        Self {
            title: notice.title,
            message: notice.description,
            actions: vec![
                RecoveryAction::GoBack,
                RecoveryAction::GoHome {
                    path: home_path.into(),
                },
            ],
        }
    }
}

/// What a guard does on entering `Denied`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyPolicy {
    /// Render nothing in place and navigate to `target` (which is expected
    /// to show a [`DeniedScreen`]).
    Redirect {
        /// Destination location.
        target: String,
    },
    /// Render the given screen in place.
    Fallback(DeniedScreen),
}

impl DenyPolicy {
    /// Redirect to the configured unauthorized location.
    pub fn from_config(config: &AccessConfig) -> Self {
        Self::Redirect {
            target: config.unauthorized_path.clone(),
        }
    }
}

impl Default for DenyPolicy {
    fn default() -> Self {
        Self::from_config(&AccessConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_targets_unauthorized_page() {
        assert_eq!(
            DenyPolicy::default(),
            DenyPolicy::Redirect {
                target: "/unauthorized".to_string()
            }
        );
    }

    #[test]
    fn test_standard_screen_offers_a_way_back() {
        let screen = DeniedScreen::standard("/");
        let labels: Vec<&str> = screen.actions.iter().map(RecoveryAction::label).collect();
        assert_eq!(labels, vec!["Go Back", "Go Home"]);
        assert_eq!(screen.title, "Access Denied");
    }
}
