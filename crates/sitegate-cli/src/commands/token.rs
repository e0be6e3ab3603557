//! Bearer token issuing for operators and scripts.

use chrono::{Duration, Utc};
use clap::{Args, Subcommand};

use sitegate_auth::TokenIssuer;
use sitegate_core::config::AppConfig;
use sitegate_core::error::AppError;
use sitegate_entity::user::Role;

use crate::output;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue a signed bearer token
    Issue {
        /// Subject (account identifier)
        #[arg(long)]
        subject: String,
        /// Role: admin, staff or guest
        #[arg(long, default_value = "guest")]
        role: Role,
        /// Lifetime in minutes (defaults to auth.access_ttl_minutes)
        #[arg(long)]
        ttl_minutes: Option<u64>,
    },
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        TokenCommand::Issue {
            subject,
            role,
            ttl_minutes,
        } => {
            let ttl = ttl_minutes.unwrap_or(config.auth.access_ttl_minutes);
            let ttl = i64::try_from(ttl)
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| AppError::validation("--ttl-minutes must be a positive number"))?;

            let issuer = TokenIssuer::new(&config.auth);
            let (token, expires_at) =
                issuer.issue_at(subject, *role, Utc::now(), Duration::minutes(ttl))?;

            output::print_kv("Subject", subject);
            output::print_kv("Role", role.as_str());
            output::print_kv("Expires", &expires_at.to_rfc3339());
            println!("{token}");
        }
    }
    Ok(())
}
