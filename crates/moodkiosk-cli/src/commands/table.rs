//! Permission table dump.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use moodkiosk_core::config::AppConfig;
use moodkiosk_core::result::AppResult;
use moodkiosk_entity::user::UserRole;

/// Arguments for the table command
#[derive(Debug, Args)]
pub struct TableArgs {
    /// Only show this role
    #[arg(short, long)]
    pub role: Option<UserRole>,
}

/// One leaf of the table
#[derive(Debug, Serialize, Tabled)]
struct LeafRow {
    role: String,
    feature: String,
    view: &'static str,
    create: &'static str,
    update: &'static str,
    delete: &'static str,
    manage: &'static str,
}

/// Print the active table, as leaf rows or as the JSON file shape
pub fn execute(args: &TableArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let resolver = super::build_resolver(config)?;
    let table = resolver.table();

    if format == OutputFormat::Json {
        match args.role {
            Some(role) => output::print_json(table.tree(role)),
            None => output::print_json(table),
        }
        return Ok(());
    }

    let roles: Vec<UserRole> = match args.role {
        Some(role) => vec![role],
        None => UserRole::ALL.to_vec(),
    };

    let mut rows = Vec::new();
    for role in roles {
        for (feature, leaf) in table.tree(role).leaves() {
            rows.push(LeafRow {
                role: role.to_string(),
                feature,
                view: output::flag(Some(leaf.view)),
                create: output::flag(leaf.create),
                update: output::flag(leaf.update),
                delete: output::flag(leaf.delete),
                manage: output::flag(leaf.manage),
            });
        }
    }

    output::print_list(&rows, format);
    Ok(())
}
