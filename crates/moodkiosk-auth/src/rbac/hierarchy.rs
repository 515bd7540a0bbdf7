//! Role hierarchy: the explicit rank map behind "at least this privileged".

use moodkiosk_core::error::AppError;
use moodkiosk_core::result::AppResult;
use moodkiosk_entity::user::UserRole;

/// Ranks shipped with the application: `VIEWER < ADMIN < SUPER_ADMIN`.
pub const STANDARD_RANKS: [(UserRole, u8); UserRole::COUNT] = [
    (UserRole::Viewer, 0),
    (UserRole::Admin, 1),
    (UserRole::SuperAdmin, 2),
];

/// Validated rank map. Every role has exactly one rank and no two roles
/// share one, so [`RoleHierarchy::rank_of`] is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleHierarchy {
    /// Rank per role, indexed by [`UserRole::slot`].
    ranks: [u8; UserRole::COUNT],
}

impl RoleHierarchy {
    /// Builds the hierarchy from `(role, rank)` pairs.
    ///
    /// Fails with a configuration error when a role is missing, listed
    /// twice, or shares its rank with another role.
    pub fn from_ranks(entries: &[(UserRole, u8)]) -> AppResult<Self> {
        let mut ranks: [Option<u8>; UserRole::COUNT] = [None; UserRole::COUNT];

        for (role, rank) in entries {
            let slot = &mut ranks[role.slot()];
            if slot.is_some() {
                return Err(AppError::configuration(format!(
                    "Role '{role}' appears more than once in the rank map"
                )));
            }
            *slot = Some(*rank);
        }

        let mut resolved = [0u8; UserRole::COUNT];
        for role in UserRole::ALL {
            resolved[role.slot()] = ranks[role.slot()].ok_or_else(|| {
                AppError::configuration(format!("Role '{role}' is missing from the rank map"))
            })?;
        }

        for (i, a) in UserRole::ALL.iter().enumerate() {
            for b in &UserRole::ALL[i + 1..] {
                if resolved[a.slot()] == resolved[b.slot()] {
                    return Err(AppError::configuration(format!(
                        "Roles '{a}' and '{b}' share rank {}",
                        resolved[a.slot()]
                    )));
                }
            }
        }

        Ok(Self { ranks: resolved })
    }

    /// The shipped hierarchy.
    pub fn standard() -> AppResult<Self> {
        Self::from_ranks(&STANDARD_RANKS)
    }

    /// Privilege rank of a role (higher = more privileged).
    pub fn rank_of(&self, role: UserRole) -> u8 {
        self.ranks[role.slot()]
    }

    /// Whether `role` is at least as privileged as `minimum`.
    pub fn has_at_least(&self, role: UserRole, minimum: UserRole) -> bool {
        self.rank_of(role) >= self.rank_of(minimum)
    }

    /// Roles from least to most privileged.
    pub fn ordered(&self) -> Vec<(UserRole, u8)> {
        let mut roles: Vec<(UserRole, u8)> = UserRole::ALL
            .into_iter()
            .map(|role| (role, self.rank_of(role)))
            .collect();
        roles.sort_by_key(|(_, rank)| *rank);
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodkiosk_core::ErrorKind;

    #[test]
    fn test_standard_ranks() {
        let hierarchy = RoleHierarchy::standard().unwrap();
        assert_eq!(hierarchy.rank_of(UserRole::Viewer), 0);
        assert_eq!(hierarchy.rank_of(UserRole::Admin), 1);
        assert_eq!(hierarchy.rank_of(UserRole::SuperAdmin), 2);
    }

    #[test]
    fn test_privilege_ordering() {
        let hierarchy = RoleHierarchy::standard().unwrap();
        assert!(hierarchy.has_at_least(UserRole::SuperAdmin, UserRole::Viewer));
        assert!(hierarchy.has_at_least(UserRole::Admin, UserRole::Admin));
        assert!(!hierarchy.has_at_least(UserRole::Viewer, UserRole::Admin));
        assert!(!hierarchy.has_at_least(UserRole::Admin, UserRole::SuperAdmin));
    }

    #[test]
    fn test_missing_role_is_configuration_error() {
        let err = RoleHierarchy::from_ranks(&[(UserRole::Viewer, 0), (UserRole::Admin, 1)])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("SUPER_ADMIN"), "got: {}", err.message);
    }

    #[test]
    fn test_duplicate_role_is_rejected() {
        let err = RoleHierarchy::from_ranks(&[
            (UserRole::Viewer, 0),
            (UserRole::Viewer, 3),
            (UserRole::Admin, 1),
            (UserRole::SuperAdmin, 2),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_shared_rank_is_rejected() {
        let err = RoleHierarchy::from_ranks(&[
            (UserRole::Viewer, 0),
            (UserRole::Admin, 1),
            (UserRole::SuperAdmin, 1),
        ])
        .unwrap_err();
        assert!(err.message.contains("share rank 1"), "got: {}", err.message);
    }

    #[test]
    fn test_ordered_follows_ranks_not_declaration() {
        let hierarchy = RoleHierarchy::from_ranks(&[
            (UserRole::SuperAdmin, 0),
            (UserRole::Viewer, 5),
            (UserRole::Admin, 9),
        ])
        .unwrap();
        let roles: Vec<UserRole> = hierarchy.ordered().into_iter().map(|(r, _)| r).collect();
        assert_eq!(
            roles,
            vec![UserRole::SuperAdmin, UserRole::Viewer, UserRole::Admin]
        );
    }
}
