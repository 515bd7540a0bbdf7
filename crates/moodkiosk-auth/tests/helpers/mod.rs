//! Shared helpers for guard and resolver integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use moodkiosk_auth::guard::{
    DenialNotice, DeniedScreen, GuardDebugInfo, GuardHost, LoadingIndicator,
};
use moodkiosk_auth::{PermissionResolver, RoleHierarchy, RolePermissionTable};

/// Everything a guard asked the host to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Loading(String),
    Protected,
    Denied(Option<String>),
    Notified(String),
    Navigated(String),
    Debug(GuardDebugInfo),
}

/// Host that records calls. `navigate` also moves the current location.
#[derive(Debug)]
pub struct RecordingHost {
    location: Mutex<String>,
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn at(location: &str) -> Arc<Self> {
        Arc::new(Self {
            location: Mutex::new(location.to_string()),
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Navigated(target) => Some(target),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, HostEvent::Notified(_)))
            .count()
    }

    pub fn rendered_protected(&self) -> bool {
        self.events().contains(&HostEvent::Protected)
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl GuardHost for RecordingHost {
    fn current_location(&self) -> String {
        self.location.lock().unwrap().clone()
    }

    fn show_loading(&self, indicator: &LoadingIndicator) {
        self.record(HostEvent::Loading(indicator.message.clone()));
    }

    fn render_protected(&self) {
        self.record(HostEvent::Protected);
    }

    fn render_denied(&self, screen: Option<&DeniedScreen>) {
        self.record(HostEvent::Denied(screen.map(|s| s.title.clone())));
    }

    fn notify(&self, notice: &DenialNotice) {
        self.record(HostEvent::Notified(notice.title.clone()));
    }

    fn navigate(&self, target: &str) {
        *self.location.lock().unwrap() = target.to_string();
        self.record(HostEvent::Navigated(target.to_string()));
    }

    fn show_debug(&self, info: &GuardDebugInfo) {
        self.record(HostEvent::Debug(info.clone()));
    }
}

/// Resolver over the compiled-in table.
pub fn builtin_resolver() -> Arc<PermissionResolver> {
    Arc::new(PermissionResolver::builtin().unwrap())
}

/// Resolver over a table given as JSON.
pub fn resolver_from_json(json: &str) -> PermissionResolver {
    PermissionResolver::new(
        RolePermissionTable::from_json_str(json).unwrap(),
        RoleHierarchy::standard().unwrap(),
    )
}

/// Let spawned guard tasks run. Time is paused in these tests, so this
/// also advances the clock by `ms`.
pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
