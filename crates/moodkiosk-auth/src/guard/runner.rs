//! Async driver: follows a principal subscription and applies what the
//! state machine decides on a [`GuardHost`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use moodkiosk_core::config::AppConfig;
use moodkiosk_core::error::AppError;
use moodkiosk_core::result::AppResult;
use moodkiosk_entity::permission::Action;
use moodkiosk_entity::user::Principal;

use crate::rbac::PermissionResolver;

use super::debug::DebugProbe;
use super::host::{self, GuardHost};
use super::machine::{GuardMachine, GuardOptions};
use super::state::{Evaluation, GuardState};

/// A guard bound to one host.
#[derive(Debug)]
pub struct AccessGuard<H: GuardHost> {
    /// Decision logic
    machine: GuardMachine,
    /// Rendering target
    host: Arc<H>,
    /// Delay before deny side effects are applied
    side_effect_delay: Duration,
    /// Development overlay gate
    probe: DebugProbe,
}

/// Why a waiting guard woke up.
enum Wake {
    Cancelled,
    PrincipalChanged,
    SourceClosed,
    Elapsed,
}

impl<H: GuardHost> AccessGuard<H> {
    /// Create a guard that applies side effects immediately and never shows
    /// the debug overlay.
    pub fn new(resolver: Arc<PermissionResolver>, options: GuardOptions, host: Arc<H>) -> Self {
        Self {
            machine: GuardMachine::new(resolver, options),
            host,
            side_effect_delay: Duration::ZERO,
            probe: DebugProbe::disabled(),
        }
    }

    /// Create a guard for `feature`/`action` with deny behavior, delay and
    /// debug gating taken from configuration.
    pub fn from_config(
        resolver: Arc<PermissionResolver>,
        feature: impl Into<String>,
        action: Action,
        config: &AppConfig,
        host: Arc<H>,
    ) -> Self {
        let options = GuardOptions::from_config(feature, &config.access).action(action);
        Self::new(resolver, options, host)
            .with_side_effect_delay(Duration::from_millis(config.access.redirect_delay_ms))
            .with_debug(DebugProbe::new(config.app.environment))
    }

    /// Set the delay before the notice and redirect are applied.
    pub fn with_side_effect_delay(mut self, delay: Duration) -> Self {
        self.side_effect_delay = delay;
        self
    }

    /// Set the debug overlay gate.
    pub fn with_debug(mut self, probe: DebugProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Current state.
    pub fn state(&self) -> GuardState {
        self.machine.state()
    }

    /// Evaluate one snapshot and apply everything at once, ignoring the
    /// side effect delay.
    pub fn evaluate(&mut self, principal: &Principal) -> GuardState {
        let evaluation = self.observe(principal);
        for effect in &evaluation.side_effects {
            host::apply(self.host.as_ref(), effect);
        }
        self.machine.state()
    }

    /// Tear the region down. Pending side effects are never applied.
    pub fn dispose(&mut self) {
        self.machine.dispose();
    }

    /// Follow `principal` until `cancel` flips to `true` (or its sender is
    /// dropped) or the principal source closes. Returns the final state.
    ///
    /// Only the latest snapshot is evaluated; a change that arrives while
    /// deny side effects are pending supersedes them. Re-publishing an equal
    /// snapshot keeps the pending deadline.
    pub async fn run(
        mut self,
        mut principal: watch::Receiver<Principal>,
        mut cancel: watch::Receiver<bool>,
    ) -> GuardState {
        let mut source_open = true;

        'evaluate: loop {
            if *cancel.borrow() {
                self.dispose();
                break;
            }

            let snapshot = principal.borrow_and_update().clone();
            let evaluation = self.observe(&snapshot);

            if !evaluation.side_effects.is_empty() {
                let deadline = Instant::now() + self.side_effect_delay;
                loop {
                    let wake = tokio::select! {
                        biased;
                        _ = cancelled(&mut cancel) => Wake::Cancelled,
                        changed = principal.changed(), if source_open => match changed {
                            Ok(()) => Wake::PrincipalChanged,
                            Err(_) => Wake::SourceClosed,
                        },
                        _ = time::sleep_until(deadline) => Wake::Elapsed,
                    };

                    match wake {
                        Wake::Cancelled => {
                            tracing::debug!(
                                feature = %self.machine.options().feature,
                                "Deny side effects suppressed by teardown"
                            );
                            self.dispose();
                            break 'evaluate;
                        }
                        Wake::PrincipalChanged => {
                            if *principal.borrow_and_update() == snapshot {
                                continue;
                            }
                            tracing::debug!(
                                feature = %self.machine.options().feature,
                                "Deny side effects superseded by a newer principal"
                            );
                            self.machine.side_effects_dropped();
                            continue 'evaluate;
                        }
                        Wake::SourceClosed => source_open = false,
                        Wake::Elapsed => {
                            for effect in &evaluation.side_effects {
                                host::apply(self.host.as_ref(), effect);
                            }
                            break;
                        }
                    }
                }
            }

            if !source_open {
                break;
            }

            let wake = tokio::select! {
                biased;
                _ = cancelled(&mut cancel) => Wake::Cancelled,
                changed = principal.changed() => match changed {
                    Ok(()) => Wake::PrincipalChanged,
                    Err(_) => Wake::SourceClosed,
                },
            };

            match wake {
                Wake::PrincipalChanged => continue,
                Wake::Cancelled => {
                    self.dispose();
                    break;
                }
                Wake::SourceClosed | Wake::Elapsed => break,
            }
        }

        self.machine.state()
    }

    /// Run on the tokio runtime. Dropping or disposing the handle tears the
    /// guard down.
    pub fn spawn(self, principal: watch::Receiver<Principal>) -> GuardHandle {
        let (cancel, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(principal, cancel_rx));
        GuardHandle { cancel, task }
    }

    fn observe(&mut self, principal: &Principal) -> Evaluation {
        let location = self.host.current_location();
        let evaluation = self.machine.observe(principal, &location);

        if let Some(presentation) = &evaluation.presentation {
            host::present(self.host.as_ref(), presentation);
        }

        if !evaluation.transitions.is_empty() || evaluation.presentation.is_some() {
            let options = self.machine.options();
            if let Some(info) = self.probe.inspect(
                self.machine.resolver(),
                principal,
                &options.feature,
                options.action,
            ) {
                self.host.show_debug(&info);
            }
        }

        evaluation
    }
}

/// Resolves once cancellation is requested or the sender is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow_and_update() {
        if cancel.changed().await.is_err() {
            return;
        }
    }
}

/// Handle to a spawned guard.
#[derive(Debug)]
pub struct GuardHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<GuardState>,
}

impl GuardHandle {
    /// Request teardown. Pending side effects are suppressed.
    pub fn dispose(&self) {
        self.cancel.send_replace(true);
    }

    /// Wait for the guard to stop and return its final state.
    pub async fn join(mut self) -> AppResult<GuardState> {
        (&mut self.task)
            .await
            .map_err(|e| AppError::internal(format!("Guard task failed: {e}")))
    }

    /// Dispose and wait for the guard to stop.
    pub async fn shutdown(self) -> AppResult<GuardState> {
        self.dispose();
        self.join().await
    }
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}
