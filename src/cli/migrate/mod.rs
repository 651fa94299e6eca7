//! Migrate command - manages the PostgreSQL schema

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::infrastructure::storage::migrations::revert_last_migration;
use crate::infrastructure::storage::{connect_pool, run_storage_migrations};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead of applying
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let pg = super::require_postgres(&config.storage, "migrate")?;

    let pool = connect_pool(&pg)
        .await
        .context("Failed to connect to PostgreSQL")?;

    if args.revert {
        match revert_last_migration(&pool).await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migrations to revert"),
        }
    } else {
        let applied = run_storage_migrations(&pool).await?;
        info!(applied, "Migrations complete");
    }

    Ok(())
}
