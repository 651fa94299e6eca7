//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::user::{CreateUserData, UpdateUserData, User, UserId, UserRepository};
use crate::domain::DomainError;

const USER_COLUMNS: &str = "id, email, first_name, last_name, age, created_at, updated_at";

/// Newest first; `seq` keeps insertion order for equal timestamps
const LIST_ORDER: &str = "ORDER BY created_at DESC, seq DESC";

/// PostgreSQL implementation of UserRepository.
///
/// Relies on the `users.email` UNIQUE constraint created by the storage
/// migrations for cross-request uniqueness.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, data: CreateUserData) -> Result<User, DomainError> {
        let id = UserId::generate();
        let query = format!(
            r#"
            INSERT INTO users (id, email, first_name, last_name, age, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(id.as_str())
            .bind(&data.email)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(data.age)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &data.email, "create"))?;

        row_to_user(&row)
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users {LIST_ORDER}");

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn update(&self, id: &UserId, data: UpdateUserData) -> Result<User, DomainError> {
        let query = format!(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                age = COALESCE($5, age),
                updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 millisecond')
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let email = data.email.clone().unwrap_or_default();

        let row = sqlx::query(&query)
            .bind(id.as_str())
            .bind(data.email)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.age)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &email, "update"))?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        Ok(())
    }
}

fn map_write_error(err: sqlx::Error, email: &str, operation: &str) -> DomainError {
    let is_unique_violation = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());

    if is_unique_violation {
        DomainError::conflict(format!("Email '{}' already exists", email))
    } else {
        DomainError::storage(format!("Failed to {} user: {}", operation, err))
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let read_err = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: String = row.try_get("id").map_err(read_err)?;
    let email: String = row.try_get("email").map_err(read_err)?;
    let first_name: String = row.try_get("first_name").map_err(read_err)?;
    let last_name: String = row.try_get("last_name").map_err(read_err)?;
    let age: i32 = row.try_get("age").map_err(read_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(read_err)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(read_err)?;

    Ok(User::new(
        UserId::new(id),
        email,
        first_name,
        last_name,
        age,
        created_at,
        updated_at,
    ))
}
