//! One-off access check.

use clap::Args;
use serde::Serialize;

use crate::output::{self, OutputFormat};
use moodkiosk_core::config::AppConfig;
use moodkiosk_core::result::AppResult;
use moodkiosk_entity::permission::Action;
use moodkiosk_entity::user::{Principal, UserRole};

/// Arguments for the check command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Role of the principal; omit for a signed-out principal
    #[arg(short, long)]
    pub role: Option<UserRole>,

    /// Dotted feature path
    #[arg(short = 'F', long)]
    pub feature: String,

    /// Requested action
    #[arg(short, long, default_value = "view")]
    pub action: Action,

    /// Minimum role, checked in addition to the feature
    #[arg(long)]
    pub min_role: Option<UserRole>,

    /// Identity still loading
    #[arg(long, conflicts_with = "error")]
    pub unloaded: bool,

    /// Identity resolution failed
    #[arg(long)]
    pub error: bool,

    /// Exit with an authorization error when access is denied
    #[arg(long)]
    pub require: bool,
}

/// Check result for output
#[derive(Debug, Serialize)]
struct CheckReport {
    principal: Principal,
    feature: String,
    action: Action,
    min_role: Option<UserRole>,
    has_access: bool,
    is_loading: bool,
    has_error: bool,
    is_ready: bool,
}

/// Evaluate the check and report it
pub fn execute(args: &CheckArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let resolver = super::build_resolver(config)?;
    let principal = principal_from(args);

    if args.require {
        resolver.require_access(&principal, &args.feature, args.action)?;
        if let Some(minimum) = args.min_role {
            resolver.require_min_role(&principal, minimum)?;
        }
    }

    let access = resolver.route_access(&principal, &args.feature, args.action, args.min_role);
    let report = CheckReport {
        principal: principal.clone(),
        feature: args.feature.clone(),
        action: args.action,
        min_role: args.min_role,
        has_access: access.has_access,
        is_loading: access.is_loading,
        has_error: access.has_error,
        is_ready: access.is_ready,
    };

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            let role = principal
                .role
                .map_or_else(|| "none".to_string(), |role| role.to_string());
            output::print_kv("Role", &role);
            output::print_kv("Feature", &report.feature);
            output::print_kv("Action", report.action.as_str());
            if let Some(minimum) = report.min_role {
                output::print_kv("Minimum role", minimum.as_str());
            }
            output::print_kv("Loading", yes_no(report.is_loading));
            output::print_kv("Identity error", yes_no(report.has_error));
            if report.has_access {
                output::print_success("Access granted");
            } else {
                output::print_warning("Access denied");
            }
        }
    }

    Ok(())
}

fn principal_from(args: &CheckArgs) -> Principal {
    if args.unloaded {
        Principal::unloaded()
    } else if args.error {
        Principal::failed(args.role)
    } else {
        args.role.map_or_else(Principal::signed_out, Principal::loaded)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
