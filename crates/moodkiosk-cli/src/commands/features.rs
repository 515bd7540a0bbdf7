//! Available features for a role.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use moodkiosk_core::config::AppConfig;
use moodkiosk_core::result::AppResult;
use moodkiosk_entity::permission::Action;
use moodkiosk_entity::user::UserRole;

/// Arguments for the features command
#[derive(Debug, Args)]
pub struct FeaturesArgs {
    /// Role to list features for
    #[arg(short, long)]
    pub role: UserRole,
}

/// Feature display row for table output
#[derive(Debug, Serialize, Tabled)]
struct FeatureRow {
    /// Dotted feature path
    feature: String,
    /// Actions the leaf grants, before any role override
    actions: String,
}

/// List viewable features in table order
pub fn execute(args: &FeaturesArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let resolver = super::build_resolver(config)?;
    let tree = resolver.table().tree(args.role);

    let rows: Vec<FeatureRow> = resolver
        .available_features(args.role)
        .into_iter()
        .map(|feature| {
            let actions = tree
                .lookup(&feature)
                .map(|leaf| {
                    leaf.granted_actions()
                        .iter()
                        .map(Action::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            FeatureRow { feature, actions }
        })
        .collect();

    if args.role.is_super_admin() && format == OutputFormat::Table && !rows.is_empty() {
        output::print_warning("SUPER_ADMIN is granted every action on each listed feature");
    }
    output::print_list(&rows, format);
    Ok(())
}
