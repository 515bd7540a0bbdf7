//! Principal feed: the publishing side of the identity subscription.

use tokio::sync::watch;
use tracing::{debug, warn};

use moodkiosk_entity::user::{Principal, UserRole};

use super::source::IdentitySource;

/// Publishes principal snapshots to any number of guards.
///
/// Receivers always observe the latest snapshot; intermediate values may
/// be skipped. Publishing an identical snapshot wakes no one.
#[derive(Debug)]
pub struct PrincipalFeed {
    /// Latest snapshot.
    tx: watch::Sender<Principal>,
}

impl PrincipalFeed {
    /// Creates a feed in the session-start state (unloaded).
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Principal::unloaded());
        Self { tx }
    }

    /// New subscription starting at the current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Principal> {
        self.tx.subscribe()
    }

    /// The current snapshot.
    pub fn current(&self) -> Principal {
        self.tx.borrow().clone()
    }

    /// Replace the snapshot. Returns whether it changed.
    pub fn publish(&self, principal: Principal) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == principal {
                return false;
            }
            debug!(
                role = ?principal.role,
                is_loaded = principal.is_loaded,
                has_error = principal.has_error,
                "Principal updated"
            );
            *current = principal;
            true
        })
    }

    /// Identity resolution started.
    pub fn begin_loading(&self) -> bool {
        self.publish(Principal::unloaded())
    }

    /// Identity resolved to `role`.
    pub fn resolve(&self, role: UserRole) -> bool {
        self.publish(Principal::loaded(role))
    }

    /// Identity resolution failed.
    pub fn fail(&self) -> bool {
        self.publish(Principal::failed(None))
    }

    /// The user signed out; every check now denies.
    pub fn sign_out(&self) -> bool {
        self.publish(Principal::signed_out())
    }

    /// Resolve identity once from `source` and publish the outcome.
    ///
    /// A failed lookup publishes an error principal, never a fallback role.
    pub async fn load_from(&self, source: &dyn IdentitySource) -> Principal {
        self.begin_loading();
        match source.current_role().await {
            Ok(Some(role)) => {
                self.resolve(role);
            }
            Ok(None) => {
                self.sign_out();
            }
            Err(e) => {
                warn!(error = %e, "Identity resolution failed; denying all access");
                self.fail();
            }
        }
        self.current()
    }
}

impl Default for PrincipalFeed {
    fn default() -> Self {
        Self::new()
    }
}
