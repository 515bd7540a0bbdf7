//! Permission leaf: the action flags one role holds on one feature.

use serde::{Deserialize, Serialize};

use super::action::Action;

/// Boolean capability flags attached to a feature.
///
/// `view` is mandatory. Every other flag is optional and an absent flag is
/// never treated as granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Permission {
    /// Whether the feature is visible.
    pub view: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manage: Option<bool>,
}

impl Permission {
    /// A leaf that only grants `view`.
    pub fn view_only() -> Self {
        Self {
            view: true,
            ..Self::default()
        }
    }

    /// A leaf granting `view` plus the listed actions.
    pub fn viewing_with(actions: &[Action]) -> Self {
        actions
            .iter()
            .fold(Self::view_only(), |leaf, action| leaf.with(*action, true))
    }

    /// Returns a copy with one flag set explicitly.
    pub fn with(mut self, action: Action, granted: bool) -> Self {
        match action {
            Action::View => self.view = granted,
            Action::Create => self.create = Some(granted),
            Action::Update => self.update = Some(granted),
            Action::Delete => self.delete = Some(granted),
            Action::Manage => self.manage = Some(granted),
        }
        self
    }

    /// Whether this leaf grants the action. Absent flags deny.
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.view,
            Action::Create => self.create.unwrap_or(false),
            Action::Update => self.update.unwrap_or(false),
            Action::Delete => self.delete.unwrap_or(false),
            Action::Manage => self.manage.unwrap_or(false),
        }
    }

    /// Actions this leaf grants, in flag order.
    pub fn granted_actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|action| self.allows(*action))
            .collect()
    }
}
