//! User CRUD Service
//!
//! A REST service managing user records:
//! - Create, list, fetch, update and delete users
//! - Unique email enforcement in the use-case layer and in storage
//! - In-memory or PostgreSQL storage selected by configuration

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use tracing::info;

use api::state::AppState;
use infrastructure::storage::{StorageConfig, StorageFactory};

/// Create the application state from configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage = StorageConfig::from_settings(&config.storage)?;
    info!("Storage backend: {:?}", storage.storage_type());

    let repository = StorageFactory::create_user_repository(&storage).await?;

    Ok(AppState::from_repository(repository))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_state_uses_memory_storage() {
        let state = create_app_state_with_config(&AppConfig::default()).await.unwrap();
        assert!(state.user_service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_backend_is_rejected() {
        let mut config = AppConfig::default();
        config.storage.backend = "cassandra".to_string();

        let err = create_app_state_with_config(&config).await.err().unwrap();
        assert!(err.to_string().contains("cassandra"));
    }
}
