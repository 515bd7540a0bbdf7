//! Development-only view of what a guard sees.

use std::fmt;

use serde::Serialize;

use moodkiosk_core::config::Environment;
use moodkiosk_entity::permission::Action;
use moodkiosk_entity::user::{Principal, UserRole};

use crate::rbac::PermissionResolver;

/// Read-only snapshot of one guard decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardDebugInfo {
    pub feature: String,
    pub action: Action,
    pub role: Option<UserRole>,
    pub is_loading: bool,
    pub can_access: bool,
}

impl GuardDebugInfo {
    /// Evaluate `feature`/`action` for `principal` without side effects.
    pub fn capture(
        resolver: &PermissionResolver,
        principal: &Principal,
        feature: &str,
        action: Action,
    ) -> Self {
        Self {
            feature: feature.to_string(),
            action,
            role: principal.role,
            is_loading: principal.is_loading(),
            can_access: resolver.can_access(principal, feature, action),
        }
    }
}

impl fmt::Display for GuardDebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
        writeln!(f, "Feature: {}", self.feature)?;
        writeln!(f, "Action: {}", self.action)?;
        match self.role {
            Some(role) => writeln!(f, "Role: {role}")?,
            None => writeln!(f, "Role: none")?,
        }
        writeln!(f, "Loading: {}", yes_no(self.is_loading))?;
        write!(f, "Has Access: {}", yes_no(self.can_access))
    }
}

/// Gate for the debug surface. Only a development runtime produces output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugProbe {
    enabled: bool,
}

impl DebugProbe {
    pub fn new(environment: Environment) -> Self {
        Self {
            enabled: environment.is_development(),
        }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Debug info for the decision, or `None` outside development.
    pub fn inspect(
        &self,
        resolver: &PermissionResolver,
        principal: &Principal,
        feature: &str,
        action: Action,
    ) -> Option<GuardDebugInfo> {
        self.enabled
            .then(|| GuardDebugInfo::capture(resolver, principal, feature, action))
    }
}
