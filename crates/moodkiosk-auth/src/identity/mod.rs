//! Boundary with the identity collaborator.
//!
//! - `source`: the collaborator that answers "who is signed in"
//! - `feed`: publishes principal snapshots to every guard

pub mod feed;
pub mod source;

pub use feed::PrincipalFeed;
pub use source::{IdentitySource, StaticIdentity};
