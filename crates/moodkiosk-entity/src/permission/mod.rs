//! Capability actions, permission leaves, and the hierarchical feature tree.

pub mod action;
pub mod feature;
pub mod model;

pub use action::Action;
pub use feature::{FeatureNode, FeaturePath, FeatureTree};
pub use model::Permission;
