//! Guard simulation against a console host.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use clap::Args;
use serde::Serialize;

use crate::output::{self, OutputFormat};
use moodkiosk_auth::guard::{
    DebugProbe, DenialNotice, DeniedScreen, DenyPolicy, GuardDebugInfo, GuardHost, LoadingIndicator,
};
use moodkiosk_auth::identity::StaticIdentity;
use moodkiosk_auth::{AccessGuard, GuardOptions, GuardState, PrincipalFeed};
use moodkiosk_core::config::AppConfig;
use moodkiosk_core::error::AppError;
use moodkiosk_core::result::AppResult;
use moodkiosk_entity::permission::Action;
use moodkiosk_entity::user::UserRole;

/// Arguments for the simulate command
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Role the identity source resolves to; omit for nobody signed in
    #[arg(short, long)]
    pub role: Option<UserRole>,

    /// Dotted feature path
    #[arg(short = 'F', long)]
    pub feature: String,

    /// Requested action
    #[arg(short, long, default_value = "view")]
    pub action: Action,

    /// Identity lookup latency in milliseconds
    #[arg(long, default_value_t = 300)]
    pub load_ms: u64,

    /// Location the host starts at
    #[arg(short, long, default_value = "/")]
    pub location: String,

    /// Identity lookup fails
    #[arg(long)]
    pub fail: bool,

    /// Render the denied screen in place instead of redirecting
    #[arg(long)]
    pub fallback: bool,
}

/// Something the guard asked the console to do
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum HostEvent {
    Loading { message: String },
    Protected { feature: String },
    Denied { screen: Option<DeniedScreen> },
    Notice { title: String, description: String },
    Navigate { from: String, to: String },
    Debug { info: GuardDebugInfo },
}

/// Simulation result for JSON output
#[derive(Debug, Serialize)]
struct SimulationReport {
    feature: String,
    action: Action,
    final_state: GuardState,
    final_location: String,
    events: Vec<HostEvent>,
}

/// Host that echoes each call to the console and keeps a log
#[derive(Debug)]
struct ConsoleHost {
    feature: String,
    location: Mutex<String>,
    events: Mutex<Vec<HostEvent>>,
    echo: bool,
}

impl ConsoleHost {
    fn new(feature: &str, location: &str, echo: bool) -> Self {
        Self {
            feature: feature.to_string(),
            location: Mutex::new(location.to_string()),
            events: Mutex::new(Vec::new()),
            echo,
        }
    }

    fn record(&self, event: HostEvent) {
        if self.echo {
            echo(&event);
        }
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn take_events(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl GuardHost for ConsoleHost {
    fn current_location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn show_loading(&self, indicator: &LoadingIndicator) {
        self.record(HostEvent::Loading {
            message: indicator.message.clone(),
        });
    }

    fn render_protected(&self) {
        self.record(HostEvent::Protected {
            feature: self.feature.clone(),
        });
    }

    fn render_denied(&self, screen: Option<&DeniedScreen>) {
        self.record(HostEvent::Denied {
            screen: screen.cloned(),
        });
    }

    fn notify(&self, notice: &DenialNotice) {
        self.record(HostEvent::Notice {
            title: notice.title.clone(),
            description: notice.description.clone(),
        });
    }

    fn navigate(&self, target: &str) {
        let from = std::mem::replace(
            &mut *self.location.lock().unwrap_or_else(PoisonError::into_inner),
            target.to_string(),
        );
        self.record(HostEvent::Navigate {
            from,
            to: target.to_string(),
        });
    }

    fn show_debug(&self, info: &GuardDebugInfo) {
        self.record(HostEvent::Debug { info: info.clone() });
    }
}

fn echo(event: &HostEvent) {
    match event {
        HostEvent::Loading { message } => println!("[loading]  {message}"),
        HostEvent::Protected { feature } => println!("[granted]  rendering '{feature}'"),
        HostEvent::Denied { screen: None } => println!("[denied]   rendering nothing"),
        HostEvent::Denied {
            screen: Some(screen),
        } => {
            let actions: Vec<&str> = screen.actions.iter().map(|a| a.label()).collect();
            println!(
                "[denied]   {}: {} [{}]",
                screen.title,
                screen.message,
                actions.join(" | ")
            );
        }
        HostEvent::Notice { title, description } => println!("[notice]   {title}: {description}"),
        HostEvent::Navigate { from, to } => println!("[navigate] {from} -> {to}"),
        HostEvent::Debug { info } => {
            for line in info.to_string().lines() {
                println!("[debug]    {line}");
            }
        }
    }
}

/// Run one guard through a delayed identity load
pub async fn execute(
    args: &SimulateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let resolver = Arc::new(super::build_resolver(config)?);
    let host = Arc::new(ConsoleHost::new(
        &args.feature,
        &args.location,
        format == OutputFormat::Table,
    ));

    let mut options =
        GuardOptions::from_config(args.feature.as_str(), &config.access).action(args.action);
    if args.fallback {
        options = options.on_deny(DenyPolicy::Fallback(DeniedScreen::standard(
            config.access.home_path.as_str(),
        )));
    }

    let guard = AccessGuard::new(resolver, options, host.clone())
        .with_side_effect_delay(Duration::from_millis(config.access.redirect_delay_ms))
        .with_debug(DebugProbe::new(config.app.environment));

    let identity = match (args.fail, args.role) {
        (true, _) => {
            StaticIdentity::failing(AppError::authentication("Identity provider unavailable"))
        }
        (false, Some(role)) => StaticIdentity::signed_in(role),
        (false, None) => StaticIdentity::anonymous(),
    }
    .with_latency(Duration::from_millis(args.load_ms));

    tracing::info!(
        feature = %args.feature,
        action = %args.action,
        role = ?args.role,
        load_ms = args.load_ms,
        "Starting guard simulation"
    );

    let feed = PrincipalFeed::new();
    let handle = guard.spawn(feed.subscribe());
    feed.load_from(&identity).await;
    drop(feed);

    let final_state = handle.join().await?;
    let final_location = host.current_location();

    match format {
        OutputFormat::Json => output::print_json(&SimulationReport {
            feature: args.feature.clone(),
            action: args.action,
            final_state,
            final_location,
            events: host.take_events(),
        }),
        OutputFormat::Table => {
            output::print_kv("Final state", &format!("{final_state:?}"));
            output::print_kv("Final location", &final_location);
        }
    }

    Ok(())
}
