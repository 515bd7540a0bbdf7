//! Synchronous guard state machine.
//!
//! Rules:
//! - Every change of the principal snapshot re-enters `Checking` before a
//!   new decision is committed. An identical snapshot changes nothing
//!   beyond reissuing deny side effects that were dropped.
//! - While the principal is unloaded the guard presents its loading
//!   indicator and commits nothing.
//! - The presentation is only reissued when the outcome differs from what
//!   is currently shown.
//! - Deny side effects are issued once per entry into `Denied`, and not at
//!   all when the host already sits at the redirect target.

use std::sync::Arc;

use tracing::debug;

use moodkiosk_core::config::AccessConfig;
use moodkiosk_entity::permission::Action;
use moodkiosk_entity::user::Principal;

use crate::rbac::PermissionResolver;

use super::debug::GuardDebugInfo;
use super::policy::{DenialNotice, DenyPolicy, LoadingIndicator};
use super::state::{Evaluation, GuardState, Presentation, SideEffect};

/// What a guard protects and how it behaves on denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOptions {
    /// Dotted feature path.
    pub feature: String,
    /// Requested action.
    pub action: Action,
    /// Behavior on entering `Denied`.
    pub on_deny: DenyPolicy,
    /// Shown while identity loads.
    pub loading: LoadingIndicator,
    /// Whether denial raises a notice.
    pub notify: bool,
}

impl GuardOptions {
    /// `view` access to `feature`, redirecting to `/unauthorized` on denial.
    pub fn new(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            action: Action::View,
            on_deny: DenyPolicy::default(),
            loading: LoadingIndicator::default(),
            notify: true,
        }
    }

    /// Options seeded from the `[access]` configuration section.
    pub fn from_config(feature: impl Into<String>, config: &AccessConfig) -> Self {
        Self {
            on_deny: DenyPolicy::from_config(config),
            notify: config.notify_on_deny,
            ..Self::new(feature)
        }
    }

    /// Set the requested action.
    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Set the deny policy.
    pub fn on_deny(mut self, policy: DenyPolicy) -> Self {
        self.on_deny = policy;
        self
    }

    /// Set the loading indicator.
    pub fn loading(mut self, indicator: LoadingIndicator) -> Self {
        self.loading = indicator;
        self
    }

    /// Enable or disable the denial notice.
    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}

/// Guard state machine for one protected region.
#[derive(Debug)]
pub struct GuardMachine {
    /// Shared resolver.
    resolver: Arc<PermissionResolver>,
    /// Protected feature and deny behavior.
    options: GuardOptions,
    /// Current state.
    state: GuardState,
    /// Outcome currently presented by the host.
    presented: Option<GuardState>,
    /// Last principal snapshot evaluated.
    snapshot: Option<Principal>,
    /// Deny side effects were issued for the current denial.
    side_effects_issued: bool,
    /// Region torn down; nothing more is issued.
    disposed: bool,
}

impl GuardMachine {
    /// Creates a machine in `Checking` with nothing presented.
    pub fn new(resolver: Arc<PermissionResolver>, options: GuardOptions) -> Self {
        Self {
            resolver,
            options,
            state: GuardState::Checking,
            presented: None,
            snapshot: None,
            side_effects_issued: false,
            disposed: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Guard options.
    pub fn options(&self) -> &GuardOptions {
        &self.options
    }

    /// Resolver the machine decides with.
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Last principal evaluated, if any.
    pub fn snapshot(&self) -> Option<&Principal> {
        self.snapshot.as_ref()
    }

    /// Whether the region has been torn down.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Feed one principal snapshot. `location` is the host's current
    /// location, used to suppress a redirect to where the host already is.
    pub fn observe(&mut self, principal: &Principal, location: &str) -> Evaluation {
        if self.disposed {
            return Evaluation::default();
        }
        if self.snapshot.as_ref() == Some(principal) {
            return Evaluation {
                side_effects: self.owed_side_effects(location),
                ..Evaluation::default()
            };
        }
        self.snapshot = Some(principal.clone());

        let mut transitions = Vec::new();
        if self.state.is_terminal() {
            self.state = GuardState::Checking;
            transitions.push(GuardState::Checking);
        }

        let outcome = if !principal.is_loaded {
            GuardState::Checking
        } else if self
            .resolver
            .can_access(principal, &self.options.feature, self.options.action)
        {
            GuardState::Granted
        } else {
            GuardState::Denied
        };

        if outcome.is_terminal() {
            self.state = outcome;
            transitions.push(outcome);
            debug!(
                feature = %self.options.feature,
                action = %self.options.action,
                role = ?principal.role,
                has_error = principal.has_error,
                state = ?outcome,
                "Guard decision"
            );
        }

        let presentation = if self.presented != Some(outcome) {
            self.presented = Some(outcome);
            Some(self.presentation_for(outcome))
        } else {
            None
        };

        if outcome != GuardState::Denied {
            self.side_effects_issued = false;
        }
        let side_effects = self.owed_side_effects(location);

        Evaluation {
            transitions,
            presentation,
            side_effects,
        }
    }

    /// The side effects from the last evaluation were never applied. They
    /// are issued again if the next evaluation still denies.
    pub fn side_effects_dropped(&mut self) {
        self.side_effects_issued = false;
    }

    /// Tear the region down. Later evaluations issue nothing.
    pub fn dispose(&mut self) {
        if !self.disposed {
            debug!(feature = %self.options.feature, state = ?self.state, "Guard disposed");
        }
        self.disposed = true;
    }

    /// Read-only view of what the guard currently sees.
    pub fn debug_info(&self) -> GuardDebugInfo {
        let principal = self.snapshot.clone().unwrap_or_default();
        GuardDebugInfo::capture(
            &self.resolver,
            &principal,
            &self.options.feature,
            self.options.action,
        )
    }

    fn owed_side_effects(&mut self, location: &str) -> Vec<SideEffect> {
        if self.state != GuardState::Denied || self.side_effects_issued {
            return Vec::new();
        }
        self.side_effects_issued = true;
        self.deny_side_effects(location)
    }

    fn presentation_for(&self, outcome: GuardState) -> Presentation {
        match outcome {
            GuardState::Checking => Presentation::Loading(self.options.loading.clone()),
            GuardState::Granted => Presentation::Protected,
            GuardState::Denied => match &self.options.on_deny {
                DenyPolicy::Redirect { .. } => Presentation::Denied(None),
                DenyPolicy::Fallback(screen) => Presentation::Denied(Some(screen.clone())),
            },
        }
    }

    fn deny_side_effects(&self, location: &str) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        match &self.options.on_deny {
            DenyPolicy::Redirect { target } => {
                if location == target {
                    debug!(redirect = %target, "Already at redirect target; suppressing redirect");
                    return effects;
                }
                if self.options.notify {
                    effects.push(SideEffect::Notify(DenialNotice::default()));
                }
                effects.push(SideEffect::Navigate(target.clone()));
            }
            DenyPolicy::Fallback(_) => {
                if self.options.notify {
                    effects.push(SideEffect::Notify(DenialNotice::default()));
                }
            }
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::policy::DeniedScreen;
    use moodkiosk_entity::user::UserRole;

    fn machine(options: GuardOptions) -> GuardMachine {
        GuardMachine::new(Arc::new(PermissionResolver::builtin().unwrap()), options)
    }

    fn navigations(evaluation: &Evaluation) -> Vec<&str> {
        evaluation
            .side_effects
            .iter()
            .filter_map(|effect| match effect {
                SideEffect::Navigate(target) => Some(target.as_str()),
                SideEffect::Notify(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_loading_then_denied() {
        let mut m = machine(GuardOptions::new("settings.dbConsole"));

        let loading = m.observe(&Principal::unloaded(), "/settings");
        assert_eq!(m.state(), GuardState::Checking);
        assert!(loading.transitions.is_empty());
        assert!(matches!(loading.presentation, Some(Presentation::Loading(_))));
        assert!(loading.side_effects.is_empty());

        let denied = m.observe(&Principal::loaded(UserRole::Viewer), "/settings");
        assert_eq!(m.state(), GuardState::Denied);
        assert_eq!(denied.transitions, vec![GuardState::Denied]);
        assert_eq!(denied.presentation, Some(Presentation::Denied(None)));
        assert_eq!(navigations(&denied), vec!["/unauthorized"]);
        assert!(matches!(denied.side_effects[0], SideEffect::Notify(_)));
    }

    #[test]
    fn test_grant_presents_protected_once() {
        let mut m = machine(GuardOptions::new("reports").action(Action::Create));
        m.observe(&Principal::unloaded(), "/reports");

        let granted = m.observe(&Principal::loaded(UserRole::Admin), "/reports");
        assert_eq!(granted.presentation, Some(Presentation::Protected));

        assert!(m.observe(&Principal::loaded(UserRole::Admin), "/reports").is_empty());

        let promoted = m.observe(&Principal::loaded(UserRole::SuperAdmin), "/reports");
        assert_eq!(
            promoted.transitions,
            vec![GuardState::Checking, GuardState::Granted]
        );
        assert!(promoted.presentation.is_none(), "content stays mounted");
    }

    #[test]
    fn test_deny_side_effects_fire_once_while_denied() {
        let mut m = machine(GuardOptions::new("settings.deleteMoods").action(Action::Delete));
        let first = m.observe(&Principal::loaded(UserRole::Viewer), "/settings");
        assert_eq!(navigations(&first), vec!["/unauthorized"]);

        let again = m.observe(&Principal::signed_out(), "/settings");
        assert_eq!(m.state(), GuardState::Denied);
        assert!(again.presentation.is_none());
        assert!(again.side_effects.is_empty());
    }

    #[test]
    fn test_reentering_denied_after_loading_fires_again() {
        let mut m = machine(GuardOptions::new("settings.dbConsole"));
        m.observe(&Principal::loaded(UserRole::Admin), "/settings");
        m.observe(&Principal::unloaded(), "/settings");
        let second = m.observe(&Principal::loaded(UserRole::Viewer), "/settings");
        assert_eq!(navigations(&second), vec!["/unauthorized"]);
    }

    #[test]
    fn test_redirect_suppressed_at_target() {
        let mut m = machine(GuardOptions::new("settings.dbConsole"));
        let denied = m.observe(&Principal::loaded(UserRole::Viewer), "/unauthorized");
        assert_eq!(m.state(), GuardState::Denied);
        assert!(denied.side_effects.is_empty());
    }

    #[test]
    fn test_fallback_renders_screen_in_place() {
        let screen = DeniedScreen::standard("/");
        let mut m = machine(
            GuardOptions::new("settings.dbConsole")
                .on_deny(DenyPolicy::Fallback(screen.clone()))
                .notify(false),
        );
        let denied = m.observe(&Principal::loaded(UserRole::Admin), "/settings");
        assert_eq!(denied.presentation, Some(Presentation::Denied(Some(screen))));
        assert!(denied.side_effects.is_empty());
    }

    #[test]
    fn test_role_change_reevaluates() {
        let mut m = machine(GuardOptions::new("settings.deleteMoods"));
        m.observe(&Principal::loaded(UserRole::Admin), "/settings");
        assert_eq!(m.state(), GuardState::Granted);

        let demoted = m.observe(&Principal::loaded(UserRole::Viewer), "/settings");
        assert_eq!(
            demoted.transitions,
            vec![GuardState::Checking, GuardState::Denied]
        );
        assert_eq!(navigations(&demoted), vec!["/unauthorized"]);
    }

    #[test]
    fn test_identity_error_denies() {
        let mut m = machine(GuardOptions::new("homepage"));
        m.observe(&Principal::failed(Some(UserRole::SuperAdmin)), "/");
        assert_eq!(m.state(), GuardState::Denied);
    }

    #[test]
    fn test_dropped_side_effects_are_reissued() {
        let mut m = machine(GuardOptions::new("settings.dbConsole"));
        m.observe(&Principal::loaded(UserRole::Viewer), "/settings");
        m.side_effects_dropped();
        let next = m.observe(&Principal::loaded(UserRole::Admin), "/settings");
        assert_eq!(navigations(&next), vec!["/unauthorized"]);
    }

    #[test]
    fn test_dropped_side_effects_survive_an_identical_snapshot() {
        let mut m = machine(GuardOptions::new("settings.dbConsole"));
        let viewer = Principal::loaded(UserRole::Viewer);
        m.observe(&viewer, "/settings");
        m.side_effects_dropped();
        let again = m.observe(&viewer, "/settings");
        assert!(again.presentation.is_none());
        assert_eq!(navigations(&again), vec!["/unauthorized"]);
        assert!(m.observe(&viewer, "/settings").is_empty());
    }

    #[test]
    fn test_disposed_machine_is_inert() {
        let mut m = machine(GuardOptions::new("settings.dbConsole"));
        m.observe(&Principal::unloaded(), "/settings");
        m.dispose();
        let after = m.observe(&Principal::loaded(UserRole::Viewer), "/settings");
        assert!(after.is_empty());
        assert_eq!(m.state(), GuardState::Checking);
    }

    #[test]
    fn test_debug_info_reflects_snapshot() {
        let mut m = machine(GuardOptions::new("reports").action(Action::Create));
        let info = m.debug_info();
        assert!(info.is_loading);
        assert!(!info.can_access);

        m.observe(&Principal::loaded(UserRole::Admin), "/reports");
        let info = m.debug_info();
        assert_eq!(info.role, Some(UserRole::Admin));
        assert!(info.can_access);
    }
}
