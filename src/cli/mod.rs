//! CLI module for the User CRUD Service
//!
//! Provides subcommands:
//! - `serve`: run the HTTP API
//! - `migrate`: apply (or revert) PostgreSQL schema migrations
//! - `seed`: replace all users with a small sample set

pub mod migrate;
pub mod seed;
pub mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{AppConfig, StorageSettings};
use crate::infrastructure::logging;
use crate::infrastructure::storage::{PostgresConfig, StorageConfig};

/// User CRUD Service - REST API for managing user records
#[derive(Parser)]
#[command(name = "user-crud-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Apply pending PostgreSQL migrations
    Migrate(migrate::MigrateArgs),

    /// Delete all users and insert the sample users
    Seed,
}

/// Load `.env`, read configuration and install the log subscriber.
///
/// A malformed configuration aborts the command instead of falling back to
/// defaults, which would silently switch storage to memory.
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}

/// PostgreSQL settings for commands that only make sense against a database
fn require_postgres(settings: &StorageSettings, command: &str) -> anyhow::Result<PostgresConfig> {
    match StorageConfig::from_settings(settings)? {
        StorageConfig::Postgres { config, .. } => Ok(config),
        StorageConfig::InMemory => {
            anyhow::bail!("{} requires storage.backend = \"postgres\"", command)
        }
    }
}
