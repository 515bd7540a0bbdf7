//! Capability action names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five capability flags a permission leaf can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// See the feature.
    #[default]
    View,
    /// Create new records under the feature.
    Create,
    /// Modify existing records.
    Update,
    /// Remove records.
    Delete,
    /// Administer the feature itself.
    Manage,
}

impl Action {
    /// Every action, in flag order.
    pub const ALL: [Action; 5] = [
        Self::View,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::Manage,
    ];

    /// Return the action name as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = moodkiosk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "manage" => Ok(Self::Manage),
            _ => Err(moodkiosk_core::AppError::validation(format!(
                "Invalid action: '{s}'. Expected one of: view, create, update, delete, manage"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trips_names() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn test_from_str_is_case_sensitive() {
        assert!("View".parse::<Action>().is_err());
        assert!("read".parse::<Action>().is_err());
    }

    #[test]
    fn test_default_is_view() {
        assert_eq!(Action::default(), Action::View);
    }
}
