//! Role-based access control: rank hierarchy, permission table, resolver.

pub mod hierarchy;
pub mod resolver;
pub mod table;

pub use hierarchy::{RoleHierarchy, STANDARD_RANKS};
pub use resolver::{PermissionCheck, PermissionResolver, RouteAccess};
pub use table::RolePermissionTable;
