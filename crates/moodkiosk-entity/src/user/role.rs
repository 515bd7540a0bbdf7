//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the kiosk console.
///
/// No `Ord` impl: privilege order comes only from the rank map in
/// `moodkiosk_auth::RoleHierarchy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Read-only access to reports and personal settings.
    Viewer,
    /// School administrator.
    Admin,
    /// Operator of the whole deployment.
    SuperAdmin,
}

impl UserRole {
    /// Number of declared roles.
    pub const COUNT: usize = 3;

    /// Every declared role, in declaration order.
    pub const ALL: [UserRole; Self::COUNT] = [Self::Viewer, Self::Admin, Self::SuperAdmin];

    /// Storage slot of this role in per-role arrays. Not a privilege rank.
    pub fn slot(&self) -> usize {
        match self {
            Self::Viewer => 0,
            Self::Admin => 1,
            Self::SuperAdmin => 2,
        }
    }

    /// Check if this role is the super administrator.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Return the role in its canonical upper-snake form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "VIEWER",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = moodkiosk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "viewer" => Ok(Self::Viewer),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(moodkiosk_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: VIEWER, ADMIN, SUPER_ADMIN"
            ))),
        }
    }
}
