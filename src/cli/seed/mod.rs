//! Seed command - resets the PostgreSQL user table to the sample users

use tracing::info;

use crate::infrastructure::storage::{StorageConfig, StorageFactory};
use crate::infrastructure::user::seed_users;

/// Seeding a memory store would be lost on exit, so only PostgreSQL is accepted
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let pg = super::require_postgres(&config.storage, "seed")?;

    let repository = StorageFactory::create_user_repository(&StorageConfig::postgres(pg)).await?;
    let users = seed_users(repository.as_ref()).await?;

    for user in &users {
        info!(id = %user.id(), "Seeded user");
    }
    info!(count = users.len(), "Seeding complete");

    Ok(())
}
