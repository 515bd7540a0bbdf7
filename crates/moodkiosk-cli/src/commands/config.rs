//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use moodkiosk_core::config::AppConfig;
use moodkiosk_core::result::AppResult;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration and the permission table it selects
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: &AppConfig,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        ConfigCommand::Show => output::print_item(config, format),
        ConfigCommand::Validate => match super::build_resolver(config) {
            Ok(resolver) => {
                output::print_success(&format!("Configuration '{config_path}' is valid"));
                output::print_kv("Environment", &format!("{:?}", config.app.environment));
                output::print_kv(
                    "Permission table",
                    config
                        .access
                        .permissions_file
                        .as_deref()
                        .unwrap_or("built-in"),
                );
                let ranks: Vec<String> = resolver
                    .hierarchy()
                    .ordered()
                    .into_iter()
                    .map(|(role, rank)| format!("{role}={rank}"))
                    .collect();
                output::print_kv("Ranks", &ranks.join(" < "));
                output::print_kv("Unauthorized path", &config.access.unauthorized_path);
                output::print_kv(
                    "Redirect delay",
                    &format!("{}ms", config.access.redirect_delay_ms),
                );
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(out_path, default_config).await?;

            output::print_success(&format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}
