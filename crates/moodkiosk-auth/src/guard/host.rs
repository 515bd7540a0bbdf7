//! The UI boundary a guard drives.

use super::debug::GuardDebugInfo;
use super::policy::{DenialNotice, DeniedScreen, LoadingIndicator};
use super::state::{Presentation, SideEffect};

/// Whatever renders the protected region: a page shell, a terminal, a test
/// recorder.
///
/// Calls arrive from the guard's task, so implementations must be shareable
/// across threads.
pub trait GuardHost: Send + Sync + 'static {
    /// The location the host is currently showing.
    fn current_location(&self) -> String;

    /// Identity is loading; show the indicator.
    fn show_loading(&self, indicator: &LoadingIndicator);

    /// Show or run the protected behavior.
    fn render_protected(&self);

    /// Access refused. `None` means render nothing.
    fn render_denied(&self, screen: Option<&DeniedScreen>);

    /// Raise a user-visible notice.
    fn notify(&self, notice: &DenialNotice);

    /// Replace the current location with `target`.
    fn navigate(&self, target: &str);

    /// Development-only overlay. Ignored by default.
    fn show_debug(&self, _info: &GuardDebugInfo) {}
}

/// Render a presentation on the host.
pub(crate) fn present<H: GuardHost + ?Sized>(host: &H, presentation: &Presentation) {
    match presentation {
        Presentation::Loading(indicator) => host.show_loading(indicator),
        Presentation::Protected => host.render_protected(),
        Presentation::Denied(screen) => host.render_denied(screen.as_ref()),
    }
}

/// Apply one deny side effect on the host.
pub(crate) fn apply<H: GuardHost + ?Sized>(host: &H, effect: &SideEffect) {
    match effect {
        SideEffect::Notify(notice) => host.notify(notice),
        SideEffect::Navigate(target) => host.navigate(target),
    }
}
