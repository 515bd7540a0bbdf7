//! Permission resolver: pure evaluation of "can this principal do this".

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use moodkiosk_core::config::AccessConfig;
use moodkiosk_core::error::AppError;
use moodkiosk_core::result::AppResult;
use moodkiosk_entity::permission::{Action, FeaturePath, Permission};
use moodkiosk_entity::user::{Principal, UserRole};

use super::hierarchy::RoleHierarchy;
use super::table::RolePermissionTable;

/// One `(feature, action)` pair for [`PermissionResolver::check_multiple_permissions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    /// Dotted feature path.
    pub feature: String,
    /// Requested action.
    #[serde(default)]
    pub action: Action,
}

impl PermissionCheck {
    /// A check for an explicit action.
    pub fn new(feature: impl Into<String>, action: Action) -> Self {
        Self {
            feature: feature.into(),
            action,
        }
    }

    /// A `view` check.
    pub fn view(feature: impl Into<String>) -> Self {
        Self::new(feature, Action::View)
    }
}

/// Summary for a protected route: access plus the loading state needed to
/// decide whether a decision is final yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteAccess {
    /// Feature access and (when requested) minimum role both hold.
    pub has_access: bool,
    /// Identity is still loading.
    pub is_loading: bool,
    /// Identity resolution failed.
    pub has_error: bool,
    /// Loaded without error; `has_access` is final.
    pub is_ready: bool,
}

/// Evaluates permission checks against an immutable table.
///
/// The resolver never fails for per-call input: unresolved features,
/// missing actions, and untrusted principals all answer `false`.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    /// Shared, read-only permission table.
    table: Arc<RolePermissionTable>,
    /// Rank map for minimum-role checks.
    hierarchy: RoleHierarchy,
}

impl PermissionResolver {
    /// Creates a resolver over the given table and hierarchy.
    pub fn new(table: RolePermissionTable, hierarchy: RoleHierarchy) -> Self {
        Self {
            table: Arc::new(table),
            hierarchy,
        }
    }

    /// Compiled-in table with the standard hierarchy.
    pub fn builtin() -> AppResult<Self> {
        Ok(Self::new(
            RolePermissionTable::builtin(),
            RoleHierarchy::standard()?,
        ))
    }

    /// Resolver for the configured table. Any table or hierarchy problem is
    /// a configuration error and should abort startup.
    pub fn from_config(config: &AccessConfig) -> AppResult<Self> {
        let table = RolePermissionTable::from_config(config.permissions_file.as_deref())?;
        Ok(Self::new(table, RoleHierarchy::standard()?))
    }

    /// The underlying table.
    pub fn table(&self) -> &RolePermissionTable {
        &self.table
    }

    /// The underlying rank map.
    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }

    /// Whether the principal may perform `action` on `feature`.
    ///
    /// A super admin is granted any action on any feature that resolves to
    /// a leaf, including flags the leaf sets to `false`. An unresolved
    /// feature is denied for every role.
    pub fn can_access(&self, principal: &Principal, feature: &str, action: Action) -> bool {
        let Some(role) = principal.trusted_role() else {
            return false;
        };
        let Some(leaf) = self.resolve_leaf(role, feature) else {
            return false;
        };
        if role.is_super_admin() {
            return true;
        }
        leaf.allows(action)
    }

    /// [`Self::can_access`] with the action given by name. Unknown names deny.
    pub fn can_access_named(&self, principal: &Principal, feature: &str, action: &str) -> bool {
        match action.parse::<Action>() {
            Ok(action) => self.can_access(principal, feature, action),
            Err(_) => false,
        }
    }

    /// Whether the principal's role ranks at least `minimum`.
    pub fn has_min_role(&self, principal: &Principal, minimum: UserRole) -> bool {
        principal
            .trusted_role()
            .is_some_and(|role| self.hierarchy.has_at_least(role, minimum))
    }

    /// All checks must pass. Stops at the first denial.
    pub fn check_multiple_permissions(
        &self,
        principal: &Principal,
        checks: &[PermissionCheck],
    ) -> bool {
        checks
            .iter()
            .all(|check| self.can_access(principal, &check.feature, check.action))
    }

    /// Dotted paths of every feature the role can view, depth-first in
    /// table order. For navigation and debugging only.
    pub fn available_features(&self, role: UserRole) -> Vec<String> {
        self.table.tree(role).viewable_paths()
    }

    /// The combined answer a protected route needs.
    pub fn route_access(
        &self,
        principal: &Principal,
        feature: &str,
        action: Action,
        min_role: Option<UserRole>,
    ) -> RouteAccess {
        let has_required_role = min_role.is_none_or(|min| self.has_min_role(principal, min));
        RouteAccess {
            has_access: self.can_access(principal, feature, action) && has_required_role,
            is_loading: principal.is_loading(),
            has_error: principal.has_error,
            is_ready: principal.is_loaded && !principal.has_error,
        }
    }

    /// Guard clause for handlers: `Ok(())` if allowed, otherwise an
    /// authorization error naming the feature and action.
    pub fn require_access(
        &self,
        principal: &Principal,
        feature: &str,
        action: Action,
    ) -> AppResult<()> {
        if self.can_access(principal, feature, action) {
            return Ok(());
        }
        Err(AppError::authorization(format!(
            "{} may not {action} '{feature}'",
            describe(principal)
        )))
    }

    /// Guard clause for handlers requiring a minimum role.
    pub fn require_min_role(&self, principal: &Principal, minimum: UserRole) -> AppResult<()> {
        if self.has_min_role(principal, minimum) {
            return Ok(());
        }
        Err(AppError::authorization(format!(
            "{} is insufficient; minimum required: '{minimum}'",
            describe(principal)
        )))
    }

    /// Runs `op` only when the principal may perform the action.
    pub fn guarded<T>(
        &self,
        principal: &Principal,
        feature: &str,
        action: Action,
        op: impl FnOnce() -> AppResult<T>,
    ) -> AppResult<T> {
        self.require_access(principal, feature, action)?;
        op()
    }

    fn resolve_leaf(&self, role: UserRole, feature: &str) -> Option<&Permission> {
        let path = FeaturePath::parse(feature)?;
        self.table.tree(role).resolve(&path)
    }
}

fn describe(principal: &Principal) -> String {
    match (principal.is_loaded, principal.has_error, principal.role) {
        (false, _, _) => "Unresolved identity".to_string(),
        (true, true, _) => "Identity with a failed session".to_string(),
        (true, false, None) => "Anonymous user".to_string(),
        (true, false, Some(role)) => format!("Role '{role}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodkiosk_entity::permission::FeatureTree;

    fn resolver() -> PermissionResolver {
        PermissionResolver::builtin().unwrap()
    }

    #[test]
    fn test_viewer_can_view_but_not_create_reports() {
        let r = resolver();
        let viewer = Principal::loaded(UserRole::Viewer);
        assert!(r.can_access(&viewer, "reports", Action::View));
        assert!(!r.can_access(&viewer, "reports", Action::Create));
    }

    #[test]
    fn test_admin_can_create_reports() {
        let r = resolver();
        assert!(r.can_access(&Principal::loaded(UserRole::Admin), "reports", Action::Create));
    }

    #[test]
    fn test_untrusted_principals_are_denied() {
        let r = resolver();
        for principal in [
            Principal::unloaded(),
            Principal::signed_out(),
            Principal::failed(Some(UserRole::SuperAdmin)),
        ] {
            assert!(!r.can_access(&principal, "homepage", Action::View), "{principal:?}");
            assert!(!r.has_min_role(&principal, UserRole::Viewer), "{principal:?}");
        }
    }

    #[test]
    fn test_super_admin_override_needs_a_resolved_leaf() {
        let r = resolver();
        let root = Principal::loaded(UserRole::SuperAdmin);
        assert!(r.can_access(&root, "settings.updatePin", Action::Delete));
        assert!(r.can_access(&root, "homepage", Action::Delete));
        assert!(!r.can_access(&root, "settings.unknown", Action::View));
        assert!(!r.can_access(&root, "settings", Action::View));
        assert!(!r.can_access(&root, "", Action::View));
    }

    #[test]
    fn test_super_admin_override_ignores_explicit_false() {
        let table = RolePermissionTable::from_entries(UserRole::ALL.map(|role| {
            (
                role,
                FeatureTree::new().leaf(
                    "moods",
                    Permission::view_only().with(Action::Delete, false),
                ),
            )
        }))
        .unwrap();
        let r = PermissionResolver::new(table, RoleHierarchy::standard().unwrap());

        assert!(r.can_access(&Principal::loaded(UserRole::SuperAdmin), "moods", Action::Delete));
        assert!(!r.can_access(&Principal::loaded(UserRole::Admin), "moods", Action::Delete));
    }

    #[test]
    fn test_malformed_feature_strings_deny() {
        let r = resolver();
        let admin = Principal::loaded(UserRole::Admin);
        for feature in ["", ".", "settings.", "..reports", "reports.view", "settings..updatePin"] {
            assert!(!r.can_access(&admin, feature, Action::View), "{feature:?}");
        }
    }

    #[test]
    fn test_can_access_named() {
        let r = resolver();
        let admin = Principal::loaded(UserRole::Admin);
        assert!(r.can_access_named(&admin, "settings.deleteMoods", "delete"));
        assert!(!r.can_access_named(&admin, "settings.deleteMoods", "obliterate"));
    }

    #[test]
    fn test_has_min_role() {
        let r = resolver();
        let admin = Principal::loaded(UserRole::Admin);
        assert!(r.has_min_role(&admin, UserRole::Viewer));
        assert!(r.has_min_role(&admin, UserRole::Admin));
        assert!(!r.has_min_role(&admin, UserRole::SuperAdmin));
    }

    #[test]
    fn test_check_multiple_permissions() {
        let r = resolver();
        let admin = Principal::loaded(UserRole::Admin);
        assert!(r.check_multiple_permissions(
            &admin,
            &[
                PermissionCheck::view("reports"),
                PermissionCheck::new("settings.deleteMoods", Action::Delete),
            ]
        ));
        assert!(!r.check_multiple_permissions(
            &admin,
            &[
                PermissionCheck::view("reports"),
                PermissionCheck::view("settings.dbConsole"),
            ]
        ));
        assert!(r.check_multiple_permissions(&admin, &[]));
    }

    #[test]
    fn test_available_features_in_table_order() {
        let r = resolver();
        assert_eq!(
            r.available_features(UserRole::Viewer),
            vec![
                "homepage",
                "reports",
                "settings.defaultSchool",
                "settings.userManagement",
                "settings.updatePin",
            ]
        );
        assert!(
            r.available_features(UserRole::SuperAdmin)
                .contains(&"settings.dbConsole".to_string())
        );
    }

    #[test]
    fn test_route_access() {
        let r = resolver();

        let loading = r.route_access(&Principal::unloaded(), "reports", Action::View, None);
        assert!(loading.is_loading);
        assert!(!loading.is_ready);
        assert!(!loading.has_access);

        let viewer = Principal::loaded(UserRole::Viewer);
        let ok = r.route_access(&viewer, "reports", Action::View, None);
        assert!(ok.has_access && ok.is_ready);

        let below = r.route_access(&viewer, "reports", Action::View, Some(UserRole::Admin));
        assert!(!below.has_access);
        assert!(below.is_ready);

        let failed = r.route_access(&Principal::failed(None), "reports", Action::View, None);
        assert!(failed.has_error);
        assert!(!failed.is_ready);
    }

    #[test]
    fn test_require_access_error_names_feature() {
        let r = resolver();
        let err = r
            .require_access(&Principal::loaded(UserRole::Viewer), "reports", Action::Create)
            .unwrap_err();
        assert!(err.is_authorization());
        assert!(err.message.contains("'reports'"), "got: {}", err.message);
        assert!(err.message.contains("create"), "got: {}", err.message);
    }

    #[test]
    fn test_require_min_role() {
        let r = resolver();
        let super_admin = Principal::loaded(UserRole::SuperAdmin);
        assert!(r.require_min_role(&super_admin, UserRole::Admin).is_ok());
        let err = r
            .require_min_role(&Principal::signed_out(), UserRole::Viewer)
            .unwrap_err();
        assert!(err.message.contains("Anonymous"), "got: {}", err.message);
    }

    #[test]
    fn test_guarded_skips_operation_on_denial() {
        let r = resolver();
        let mut ran = false;
        let result = r.guarded(
            &Principal::loaded(UserRole::Viewer),
            "settings.deleteMoods",
            Action::Delete,
            || {
                ran = true;
                Ok(())
            },
        );
        assert!(result.is_err());
        assert!(!ran);

        let deleted = r.guarded(
            &Principal::loaded(UserRole::Admin),
            "settings.deleteMoods",
            Action::Delete,
            || Ok(3usize),
        );
        assert_eq!(deleted.unwrap(), 3);
    }
}
