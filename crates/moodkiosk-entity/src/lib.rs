//! # moodkiosk-entity
//!
//! Domain types shared by the permission engine and its collaborators.

pub mod permission;
pub mod user;

pub use permission::{Action, FeatureNode, FeaturePath, FeatureTree, Permission};
pub use user::{Principal, UserRole};
