//! Storage factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::config::StorageSettings;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::user::{InMemoryUserRepository, PostgresUserRepository};

use super::migrations::run_storage_migrations;
use super::postgres::{connect_pool, PostgresConfig};

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// PostgreSQL storage configuration
    Postgres {
        config: PostgresConfig,
        run_migrations: bool,
    },
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Creates a PostgreSQL storage configuration
    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres {
            config,
            run_migrations: true,
        }
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres { .. } => StorageType::Postgres,
        }
    }

    /// Build from the `storage` section of the application config
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, DomainError> {
        let storage_type = StorageType::parse(&settings.backend).ok_or_else(|| {
            DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                settings.backend
            ))
        })?;

        match storage_type {
            StorageType::InMemory => Ok(Self::in_memory()),
            StorageType::Postgres => {
                let url = settings.url.clone().ok_or_else(|| {
                    DomainError::configuration("storage.url is required for the postgres backend")
                })?;

                let config = PostgresConfig::new(url)
                    .with_max_connections(settings.max_connections)
                    .with_min_connections(settings.min_connections)
                    .with_connect_timeout(settings.connect_timeout_secs)
                    .with_idle_timeout(settings.idle_timeout_secs);

                Ok(Self::Postgres {
                    config,
                    run_migrations: settings.run_migrations,
                })
            }
        }
    }
}

/// Factory for creating repository instances
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates the user repository selected by the configuration
    pub async fn create_user_repository(
        config: &StorageConfig,
    ) -> Result<Arc<dyn UserRepository>, DomainError> {
        match config {
            StorageConfig::InMemory => {
                info!("Using in-memory user storage");
                Ok(Arc::new(InMemoryUserRepository::new()))
            }
            StorageConfig::Postgres {
                config,
                run_migrations,
            } => {
                let pool = connect_pool(config).await?;

                if *run_migrations {
                    run_storage_migrations(&pool).await?;
                }

                info!("Using PostgreSQL user storage");
                Ok(Arc::new(PostgresUserRepository::new(pool)))
            }
        }
    }
}
