//! CLI command definitions and dispatch.

pub mod check;
pub mod config;
pub mod features;
pub mod roles;
pub mod simulate;
pub mod table;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use moodkiosk_auth::PermissionResolver;
use moodkiosk_core::config::AppConfig;
use moodkiosk_core::result::AppResult;

/// MoodKiosk: role-based access rules for the kiosk console
#[derive(Debug, Parser)]
#[command(name = "moodkiosk", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the role hierarchy
    Roles,
    /// List the features a role can view
    Features(features::FeaturesArgs),
    /// Evaluate one access check
    Check(check::CheckArgs),
    /// Dump the active permission table
    Table(table::TableArgs),
    /// Run an access guard against a simulated identity load
    Simulate(simulate::SimulateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Roles => roles::execute(config, self.format),
            Commands::Features(args) => features::execute(args, config, self.format),
            Commands::Check(args) => check::execute(args, config, self.format),
            Commands::Table(args) => table::execute(args, config, self.format),
            Commands::Simulate(args) => simulate::execute(args, config, self.format).await,
            Commands::Config(args) => {
                config::execute(args, &self.config, config, self.format).await
            }
        }
    }
}

/// Helper: build the resolver from the `[access]` section
pub fn build_resolver(config: &AppConfig) -> AppResult<PermissionResolver> {
    PermissionResolver::from_config(&config.access)
}
