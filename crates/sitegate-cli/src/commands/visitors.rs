//! Visitor record listing from the PostgreSQL store.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use sitegate_core::config::AppConfig;
use sitegate_core::error::AppError;
use sitegate_database::repositories::VisitorRepository;
use sitegate_entity::visitor::VisitorRecord;

use crate::output::{self, OutputFormat};

/// Arguments for visitor commands
#[derive(Debug, Args)]
pub struct VisitorArgs {
    /// Visitor subcommand
    #[command(subcommand)]
    pub command: VisitorCommand,
}

/// Visitor subcommands
#[derive(Debug, Subcommand)]
pub enum VisitorCommand {
    /// List most recently seen visitors
    List {
        /// Maximum rows
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
    /// Count distinct visitors
    Count,
}

/// One table row
#[derive(Debug, Serialize, Tabled)]
struct VisitorRow {
    #[tabled(rename = "Origin")]
    origin: String,
    #[tabled(rename = "Signature")]
    signature: String,
    #[tabled(rename = "Visits")]
    visits: i64,
    #[tabled(rename = "First seen")]
    first_seen: String,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<VisitorRecord> for VisitorRow {
    fn from(r: VisitorRecord) -> Self {
        Self {
            origin: r.origin_id,
            signature: r.client_signature,
            visits: r.visit_count,
            first_seen: r.first_seen.format("%Y-%m-%d %H:%M:%S").to_string(),
            last_seen: r.last_seen.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute visitor commands
pub async fn execute(
    args: &VisitorArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let repo = VisitorRepository::new(pool.pool().clone());

    match &args.command {
        VisitorCommand::List { limit } => {
            let rows: Vec<VisitorRow> = repo
                .list_recent(*limit)
                .await?
                .into_iter()
                .map(VisitorRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        VisitorCommand::Count => {
            output::print_kv("Distinct visitors", &repo.count().await?.to_string());
        }
    }

    pool.close().await;
    Ok(())
}
