//! # moodkiosk-auth
//!
//! Authorization engine for the MoodKiosk console.
//!
//! ## Modules
//!
//! - `rbac`: role hierarchy, permission table, and the pure resolver
//! - `identity`: principal snapshots published by the identity collaborator
//! - `guard`: the access guard state machine and its async driver

pub mod guard;
pub mod identity;
pub mod rbac;

pub use guard::{AccessGuard, GuardHandle, GuardHost, GuardMachine, GuardOptions, GuardState};
pub use identity::{IdentitySource, PrincipalFeed};
pub use rbac::{
    PermissionCheck, PermissionResolver, RoleHierarchy, RolePermissionTable, RouteAccess,
};
