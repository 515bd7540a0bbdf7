//! Principal snapshot published by the identity collaborator.

use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// The authenticated actor as seen by the permission engine.
///
/// Snapshots are owned by the identity collaborator; readers treat them as
/// immutable for the duration of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Resolved role. `None` before loading completes or when signed out.
    pub role: Option<UserRole>,
    /// Whether identity resolution has completed (success or failure).
    pub is_loaded: bool,
    /// Whether identity resolution failed. The role is untrusted when set.
    pub has_error: bool,
}

impl Principal {
    /// Session start: nothing resolved yet.
    pub fn unloaded() -> Self {
        Self {
            role: None,
            is_loaded: false,
            has_error: false,
        }
    }

    /// Identity resolved to the given role.
    pub fn loaded(role: UserRole) -> Self {
        Self {
            role: Some(role),
            is_loaded: true,
            has_error: false,
        }
    }

    /// Resolution completed but no one is signed in.
    pub fn signed_out() -> Self {
        Self {
            role: None,
            is_loaded: true,
            has_error: false,
        }
    }

    /// Resolution failed. Any role carried along is kept for display only.
    pub fn failed(role: Option<UserRole>) -> Self {
        Self {
            role,
            is_loaded: true,
            has_error: true,
        }
    }

    /// Whether the identity is still being resolved.
    pub fn is_loading(&self) -> bool {
        !self.is_loaded
    }

    /// The role, only when it may be used for an authorization decision.
    pub fn trusted_role(&self) -> Option<UserRole> {
        if self.is_loaded && !self.has_error {
            self.role
        } else {
            None
        }
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::unloaded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trusted_role_requires_clean_load() {
        assert_eq!(Principal::unloaded().trusted_role(), None);
        assert_eq!(Principal::signed_out().trusted_role(), None);
        assert_eq!(
            Principal::failed(Some(UserRole::SuperAdmin)).trusted_role(),
            None
        );
        assert_eq!(
            Principal::loaded(UserRole::Admin).trusted_role(),
            Some(UserRole::Admin)
        );
    }

    #[test]
    fn test_unloaded_principal_with_role_is_untrusted() {
        let principal = Principal {
            role: Some(UserRole::Admin),
            is_loaded: false,
            has_error: false,
        };
        assert!(principal.is_loading());
        assert_eq!(principal.trusted_role(), None);
    }
}
