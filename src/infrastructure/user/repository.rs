//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{CreateUserData, UpdateUserData, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    /// Insertion order, breaks ties between equal `created_at` values
    sequence: u64,
}

#[derive(Debug, Default)]
struct UserStore {
    users: HashMap<String, StoredUser>,
    /// Index for email -> user ID lookup
    email_index: HashMap<String, String>,
    next_sequence: u64,
}

impl UserStore {
    fn insert(&mut self, user: User) {
        let id = user.id().as_str().to_string();
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.email_index.insert(user.email().to_string(), id.clone());
        self.users.insert(id, StoredUser { user, sequence });
    }
}

/// In-memory implementation of UserRepository.
///
/// Enforces email uniqueness the way a database constraint would, so it can
/// stand in for PostgreSQL both in tests and in local development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<UserStore>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

/// Every update moves `updated_at` forward by at least one millisecond,
/// the precision timestamps are rendered with.
fn apply_update(existing: &User, data: UpdateUserData) -> User {
    let updated_at = Utc::now().max(existing.updated_at() + Duration::milliseconds(1));

    User::new(
        existing.id().clone(),
        data.email.unwrap_or_else(|| existing.email().to_string()),
        data.first_name
            .unwrap_or_else(|| existing.first_name().to_string()),
        data.last_name
            .unwrap_or_else(|| existing.last_name().to_string()),
        data.age.unwrap_or(existing.age()),
        existing.created_at(),
        updated_at,
    )
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, data: CreateUserData) -> Result<User, DomainError> {
        let mut store = self.store.write().await;

        if store.email_index.contains_key(&data.email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                data.email
            )));
        }

        let now = Utc::now();
        let user = User::new(
            UserId::generate(),
            data.email,
            data.first_name,
            data.last_name,
            data.age,
            now,
            now,
        );

        store.insert(user.clone());

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let store = self.store.read().await;

        let mut stored: Vec<&StoredUser> = store.users.values().collect();
        stored.sort_by(|a, b| {
            b.user
                .created_at()
                .cmp(&a.user.created_at())
                .then(b.sequence.cmp(&a.sequence))
        });

        Ok(stored.into_iter().map(|s| s.user.clone()).collect())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let store = self.store.read().await;
        Ok(store.users.get(id.as_str()).map(|s| s.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let store = self.store.read().await;

        Ok(store
            .email_index
            .get(email)
            .and_then(|id| store.users.get(id))
            .map(|s| s.user.clone()))
    }

    async fn update(&self, id: &UserId, data: UpdateUserData) -> Result<User, DomainError> {
        let mut store = self.store.write().await;

        let existing = store
            .users
            .get(id.as_str())
            .map(|s| s.user.clone())
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        if let Some(new_email) = data.email.as_deref() {
            let taken_by_other = store
                .email_index
                .get(new_email)
                .is_some_and(|owner| owner != id.as_str());

            if taken_by_other {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already exists",
                    new_email
                )));
            }
        }

        let updated = apply_update(&existing, data);

        if updated.email() != existing.email() {
            store.email_index.remove(existing.email());
            store
                .email_index
                .insert(updated.email().to_string(), id.as_str().to_string());
        }

        if let Some(stored) = store.users.get_mut(id.as_str()) {
            stored.user = updated.clone();
        }

        Ok(updated)
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let mut store = self.store.write().await;

        match store.users.remove(id.as_str()) {
            Some(stored) => {
                store.email_index.remove(stored.user.email());
                Ok(())
            }
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }
}
