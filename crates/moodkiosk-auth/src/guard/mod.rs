//! Access guard: load → evaluate → allow / deny / redirect.
//!
//! - `state`: guard states and the effects an evaluation produces
//! - `policy`: deny policies, loading indicator, and denied screen content
//! - `machine`: the synchronous state machine
//! - `host`: the UI boundary the guard drives
//! - `debug`: development-only introspection
//! - `runner`: async driver over a principal subscription

pub mod debug;
pub mod host;
pub mod machine;
pub mod policy;
pub mod runner;
pub mod state;

pub use debug::{DebugProbe, GuardDebugInfo};
pub use host::GuardHost;
pub use machine::{GuardMachine, GuardOptions};
pub use policy::{DenialNotice, DenyPolicy, DeniedScreen, LoadingIndicator, RecoveryAction};
pub use runner::{AccessGuard, GuardHandle};
pub use state::{Evaluation, GuardState, Presentation, SideEffect};
