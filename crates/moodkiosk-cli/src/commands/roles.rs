//! Role hierarchy listing.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use moodkiosk_core::config::AppConfig;
use moodkiosk_core::result::AppResult;

/// Role display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role name
    role: String,
    /// Privilege rank
    rank: u8,
    /// Number of viewable features
    features: usize,
}

/// List roles from least to most privileged
pub fn execute(config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let resolver = super::build_resolver(config)?;

    let rows: Vec<RoleRow> = resolver
        .hierarchy()
        .ordered()
        .into_iter()
        .map(|(role, rank)| RoleRow {
            role: role.to_string(),
            rank,
            features: resolver.available_features(role).len(),
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
