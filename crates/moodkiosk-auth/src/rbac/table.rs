//! Role-to-feature permission table.
//!
//! The table is static configuration: the compiled-in default below, or a
//! versioned JSON file with the same shape loaded once at startup.

use std::collections::HashMap;
use std::path::Path;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tracing::info;

use moodkiosk_core::error::AppError;
use moodkiosk_core::result::AppResult;
use moodkiosk_entity::permission::{Action, FeatureTree, Permission};
use moodkiosk_entity::user::UserRole;

/// Feature tree per role. Every role has an entry, possibly empty.
///
/// The table is plain data with no special case for any role; the
/// super-admin override lives in the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HashMap<UserRole, FeatureTree>")]
pub struct RolePermissionTable {
    /// Trees indexed by [`UserRole::slot`].
    trees: [FeatureTree; UserRole::COUNT],
}

impl RolePermissionTable {
    /// Builds a table, requiring exactly one tree per role.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (UserRole, FeatureTree)>,
    ) -> AppResult<Self> {
        let mut trees: [Option<FeatureTree>; UserRole::COUNT] = Default::default();

        for (role, tree) in entries {
            let slot = &mut trees[role.slot()];
            if slot.is_some() {
                return Err(AppError::configuration(format!(
                    "Permission table defines role '{role}' more than once"
                )));
            }
            *slot = Some(tree);
        }

        if let Some(missing) = UserRole::ALL
            .into_iter()
            .find(|role| trees[role.slot()].is_none())
        {
            return Err(AppError::configuration(format!(
                "Permission table has no entry for role '{missing}'"
            )));
        }

        Ok(Self {
            trees: trees.map(Option::unwrap_or_default),
        })
    }

    /// The compiled-in table.
    pub fn builtin() -> Self {
        Self {
            trees: UserRole::ALL.map(builtin_tree),
        }
    }

    /// Parse a table from JSON text.
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            AppError::with_source(
                moodkiosk_core::ErrorKind::Configuration,
                format!("Invalid permission table: {e}"),
                e,
            )
        })
    }

    /// Load a table from a JSON file.
    pub fn load_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                moodkiosk_core::ErrorKind::Configuration,
                format!("Failed to read permission table '{}': {e}", path.display()),
                e,
            )
        })?;
        let table = Self::from_json_str(&json)?;
        info!(path = %path.display(), "Loaded permission table");
        Ok(table)
    }

    /// The compiled-in table, or the file named in configuration.
    pub fn from_config(permissions_file: Option<&str>) -> AppResult<Self> {
        match permissions_file {
            Some(path) => Self::load_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// The full feature tree for a role.
    pub fn tree(&self, role: UserRole) -> &FeatureTree {
        &self.trees[role.slot()]
    }
}

impl Default for RolePermissionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<HashMap<UserRole, FeatureTree>> for RolePermissionTable {
    type Error = AppError;

    fn try_from(map: HashMap<UserRole, FeatureTree>) -> Result<Self, Self::Error> {
        Self::from_entries(map)
    }
}

impl Serialize for RolePermissionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(UserRole::COUNT))?;
        for role in UserRole::ALL {
            map.serialize_entry(&role, self.tree(role))?;
        }
        map.end()
    }
}

fn builtin_tree(role: UserRole) -> FeatureTree {
    use Action::{Create, Delete, Manage, Update};

    let leaf = Permission::viewing_with;
    match role {
        UserRole::Viewer => FeatureTree::new()
            .leaf("homepage", Permission::view_only())
            .leaf("reports", Permission::view_only())
            .branch(
                "settings",
                FeatureTree::new()
                    .leaf("defaultSchool", leaf(&[Update]))
                    .leaf("userManagement", Permission::view_only())
                    .leaf("updatePin", leaf(&[Update])),
            ),
        UserRole::Admin => FeatureTree::new()
            .leaf("homepage", Permission::view_only())
            .leaf("reports", leaf(&[Create]))
            .branch(
                "settings",
                FeatureTree::new()
                    .leaf("defaultSchool", leaf(&[Update]))
                    .leaf("userManagement", leaf(&[Update]))
                    .leaf("updatePin", leaf(&[Update]))
                    .leaf("deleteMoods", leaf(&[Delete])),
            ),
        UserRole::SuperAdmin => FeatureTree::new()
            .leaf("homepage", leaf(&[Manage]))
            .leaf("reports", leaf(&[Create, Manage]))
            .branch(
                "settings",
                FeatureTree::new()
                    .leaf("defaultSchool", leaf(&[Update, Manage]))
                    .leaf("userManagement", leaf(&[Update, Manage]))
                    .leaf("updatePin", leaf(&[Update]))
                    .leaf("deleteMoods", leaf(&[Delete]))
                    .leaf("dbConsole", leaf(&[Manage])),
            ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodkiosk_core::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_builtin_has_every_role() {
        let table = RolePermissionTable::builtin();
        for role in UserRole::ALL {
            assert!(!table.tree(role).is_empty(), "{role} has an empty tree");
        }
    }

    #[test]
    fn test_builtin_leaves() {
        let table = RolePermissionTable::builtin();
        let viewer = table.tree(UserRole::Viewer);
        assert!(viewer.lookup("settings.deleteMoods").is_none());
        assert!(viewer.lookup("settings.dbConsole").is_none());
        assert!(viewer.lookup("settings.updatePin").unwrap().allows(Action::Update));

        let admin = table.tree(UserRole::Admin);
        assert!(admin.lookup("reports").unwrap().allows(Action::Create));
        assert!(admin.lookup("settings.dbConsole").is_none());

        let super_admin = table.tree(UserRole::SuperAdmin);
        let pin = super_admin.lookup("settings.updatePin").unwrap();
        assert!(pin.delete.is_none());
        assert!(super_admin.lookup("settings.dbConsole").unwrap().allows(Action::Manage));
    }

    #[test]
    fn test_missing_role_is_configuration_error() {
        let err = RolePermissionTable::from_entries([
            (UserRole::Viewer, FeatureTree::new()),
            (UserRole::SuperAdmin, FeatureTree::new()),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.message.contains("ADMIN"), "got: {}", err.message);
    }

    #[test]
    fn test_duplicate_role_is_configuration_error() {
        let err = RolePermissionTable::from_entries([
            (UserRole::Viewer, FeatureTree::new()),
            (UserRole::Viewer, FeatureTree::new()),
            (UserRole::Admin, FeatureTree::new()),
            (UserRole::SuperAdmin, FeatureTree::new()),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_empty_tree_is_a_valid_entry() {
        let table = RolePermissionTable::from_json_str(
            r#"{"VIEWER": {}, "ADMIN": {"reports": {"view": true}}, "SUPER_ADMIN": {}}"#,
        )
        .unwrap();
        assert!(table.tree(UserRole::Viewer).is_empty());
        assert!(table.tree(UserRole::Admin).lookup("reports").is_some());
    }

    #[test]
    fn test_json_missing_role_fails() {
        let err = RolePermissionTable::from_json_str(r#"{"VIEWER": {}, "ADMIN": {}}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_json_unknown_role_fails() {
        let err = RolePermissionTable::from_json_str(
            r#"{"VIEWER": {}, "ADMIN": {}, "SUPER_ADMIN": {}, "OWNER": {}}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_builtin_survives_json_round_trip() {
        let table = RolePermissionTable::builtin();
        let json = serde_json::to_string(&table).unwrap();
        let parsed = RolePermissionTable::from_json_str(&json).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_shipped_file_matches_builtin() {
        let shipped =
            RolePermissionTable::from_json_str(include_str!("../../../../config/permissions.json"))
                .unwrap();
        assert_eq!(shipped, RolePermissionTable::builtin());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"VIEWER": {{"homepage": {{"view": true}}}}, "ADMIN": {{}}, "SUPER_ADMIN": {{}}}}"#
        )
        .unwrap();

        let table = RolePermissionTable::from_config(file.path().to_str()).unwrap();
        assert_eq!(table.tree(UserRole::Viewer).viewable_paths(), vec!["homepage"]);
    }

    #[test]
    fn test_load_missing_file_is_configuration_error() {
        let err = RolePermissionTable::load_file("no/such/permissions.json").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
