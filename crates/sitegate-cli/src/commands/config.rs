//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use sitegate_core::config::AppConfig;
use sitegate_core::error::AppError;
use sitegate_database::connection::redact_url;

use crate::output;

/// Placeholder shown instead of secrets.
const MASK: &str = "****";

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
    /// Show the effective configuration with secrets masked
    Show,
    /// Validate configuration and print a summary
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, config_path: &str) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => output::print_json(&masked(config)),
        ConfigCommand::Validate => {
            output::print_success(&format!("Configuration '{config_path}' is valid"));
            output::print_kv("Server", &config.server.bind_address());
            output::print_kv("Database", &redact_url(&config.database.url));
            output::print_kv(
                "Visitor store",
                &format!("{:?}", config.presence.store).to_lowercase(),
            );
            output::print_kv(
                "Live max connections",
                &config.realtime.max_connections.to_string(),
            );
        }
    }
    Ok(())
}

/// Copy of `config` safe to print.
fn masked(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    shown.auth.jwt_secret = MASK.to_string();
    shown.csrf.secret = MASK.to_string();
    shown.database.url = redact_url(&config.database.url);
    shown
}
