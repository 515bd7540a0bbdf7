//! Guard states and evaluation results.

use serde::Serialize;

use super::policy::{DenialNotice, DeniedScreen, LoadingIndicator};

/// Where a guard stands with respect to the current principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardState {
    /// Identity not resolved yet; no decision has been committed.
    Checking,
    /// The protected behavior may run.
    Granted,
    /// Access was refused.
    Denied,
}

impl GuardState {
    /// Whether a decision has been committed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Checking)
    }
}

/// What the host should display after an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Identity still loading.
    Loading(LoadingIndicator),
    /// Show or run the protected behavior.
    Protected,
    /// Access refused. `None` renders nothing while a redirect is under way.
    Denied(Option<DeniedScreen>),
}

/// Deny side effects, applied at most once per entry into `Denied`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Raise a user-visible notice.
    Notify(DenialNotice),
    /// Navigate to the given location.
    Navigate(String),
}

/// Result of feeding one principal snapshot into the guard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Transitions taken during this evaluation, in order.
    pub transitions: Vec<GuardState>,
    /// New presentation, or `None` when what is shown stays valid.
    pub presentation: Option<Presentation>,
    /// Side effects still owed for the current denial.
    pub side_effects: Vec<SideEffect>,
}

impl Evaluation {
    /// Whether the evaluation asks the host to do anything.
    pub fn is_empty(&self) -> bool {
        self.presentation.is_none() && self.side_effects.is_empty()
    }
}
