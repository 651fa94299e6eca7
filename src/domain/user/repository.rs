//! User repository port and its input records

use async_trait::async_trait;

use super::entity::{User, UserId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Data required to persist a new user. Format rules are checked at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserData {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

/// Partial update; `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserData {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
}

/// Storage capability required by the user use-cases.
///
/// Implementations own id and timestamp assignment, and are expected to
/// enforce email uniqueness themselves (`DomainError::Conflict`); the
/// use-case level check is not atomic across concurrent requests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user, assigning id and timestamps
    async fn create(&self, data: CreateUserData) -> Result<User, DomainError>;

    /// All users, most recently created first
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Apply a partial update and refresh `updated_at`. Fails with `NotFound` for unknown ids.
    async fn update(&self, id: &UserId, data: UpdateUserData) -> Result<User, DomainError>;

    /// Remove a user. Fails with `NotFound` for unknown ids.
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;
}
