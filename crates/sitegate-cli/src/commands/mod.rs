//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod serve;
pub mod token;
pub mod visitors;

use clap::{Parser, Subcommand};

use sitegate_core::config::AppConfig;
use sitegate_core::error::AppError;
use sitegate_database::DatabasePool;

use crate::output::OutputFormat;

/// SiteGate: request integrity and live presence for a content site
#[derive(Debug, Parser)]
#[command(name = "sitegate", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Configuration overlay to apply (`config/{env}.toml`)
    #[arg(short, long, env = "SITEGATE_ENV")]
    pub env: Option<String>,

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
    /// Start the SiteGate server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Bearer token management
    Token(token::TokenArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Visitor records
    Visitors(visitors::VisitorArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = self.load_config()?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Token(args) => token::execute(args, &config),
            Commands::Config(args) => config::execute(args, &config, &self.config),
            Commands::Visitors(args) => visitors::execute(args, &config, self.format).await,
        }
    }

    fn load_config(&self) -> Result<AppConfig, AppError> {
        match &self.env {
            Some(env) => AppConfig::load_with_env(&self.config, env),
            None => AppConfig::load(&self.config),
        }
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}
