//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::{CreateUserData, UpdateUserData, User, UserError, UserId, UserRepository};
use crate::infrastructure::user::{InMemoryUserRepository, UserUseCases};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self { user_service }
    }

    /// State wired to the use cases over the given repository
    pub fn from_repository<R: UserRepository + ?Sized + 'static>(repository: Arc<R>) -> Self {
        Self::new(Arc::new(UserUseCases::new(repository)))
    }

    /// State backed by a fresh in-memory repository
    pub fn in_memory() -> Self {
        Self::from_repository(Arc::new(InMemoryUserRepository::new()))
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, data: CreateUserData) -> Result<User, UserError>;
    async fn list(&self) -> Result<Vec<User>, UserError>;
    async fn get(&self, id: &UserId) -> Result<User, UserError>;
    async fn update(&self, id: &UserId, data: UpdateUserData) -> Result<User, UserError>;
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}

#[async_trait::async_trait]
impl<R: UserRepository + ?Sized + 'static> UserServiceTrait for UserUseCases<R> {
    async fn create(&self, data: CreateUserData) -> Result<User, UserError> {
        self.create.execute(data).await
    }

    async fn list(&self) -> Result<Vec<User>, UserError> {
        self.get_all.execute().await
    }

    async fn get(&self, id: &UserId) -> Result<User, UserError> {
        self.get_by_id.execute(id).await
    }

    async fn update(&self, id: &UserId, data: UpdateUserData) -> Result<User, UserError> {
        self.update.execute(id, data).await
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.delete.execute(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_state_round_trip() {
        let state = AppState::in_memory();

        let created = state
            .user_service
            .create(CreateUserData {
                email: "john@example.com".to_string(),
                first_name: "John".to_string(),
                last_name: "Doe".to_string(),
                age: 30,
            })
            .await
            .unwrap();

        let fetched = state.user_service.get(created.id()).await.unwrap();
        assert_eq!(fetched, created);

        state.user_service.delete(created.id()).await.unwrap();
        assert!(state.user_service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_state_is_shared_between_clones() {
        let state = AppState::in_memory();
        let clone = state.clone();

        state
            .user_service
            .create(CreateUserData {
                email: "jane@example.com".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Smith".to_string(),
                age: 25,
            })
            .await
            .unwrap();

        assert_eq!(clone.user_service.list().await.unwrap().len(), 1);
    }
}
