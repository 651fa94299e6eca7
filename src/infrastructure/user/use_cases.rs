//! User use-cases
//!
//! One orchestrator per operation. Each takes the repository port by
//! constructor and runs its steps strictly in sequence: every write depends
//! on the outcome of the read before it. The email uniqueness check is a
//! fast path for a clear error; it is not atomic with the write, so the
//! store's own uniqueness constraint remains the source of truth and its
//! `Conflict` error is propagated unchanged.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::user::{
    CreateUserData, UpdateUserData, User, UserError, UserId, UserRepository,
};

/// Create a user after checking that the email is free
#[derive(Debug)]
pub struct CreateUserUseCase<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> CreateUserUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, data: CreateUserData) -> Result<User, UserError> {
        debug!("Creating user");

        if self.repository.find_by_email(&data.email).await?.is_some() {
            warn!("Rejected user creation: email already exists");
            return Err(UserError::duplicate_email(data.email));
        }

        let user = self.repository.create(data).await?;
        info!(id = %user.id(), "User created");

        Ok(user)
    }
}

/// List all users, most recently created first
#[derive(Debug)]
pub struct GetAllUsersUseCase<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> GetAllUsersUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Result<Vec<User>, UserError> {
        Ok(self.repository.find_all().await?)
    }
}

#[derive(Debug)]
pub struct GetUserByIdUseCase<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> GetUserByIdUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::not_found(id.clone()))
    }
}

/// Apply a partial update to an existing user
#[derive(Debug)]
pub struct UpdateUserUseCase<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> UpdateUserUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &UserId, data: UpdateUserData) -> Result<User, UserError> {
        debug!(id = %id, "Updating user");

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::not_found(id.clone()))?;

        // Exact string comparison; an unchanged email skips the lookup.
        if let Some(email) = data.email.as_deref() {
            if email != existing.email()
                && self.repository.find_by_email(email).await?.is_some()
            {
                warn!(id = %id, "Rejected user update: email already in use");
                return Err(UserError::email_conflict(email));
            }
        }

        let user = self.repository.update(id, data).await?;
        info!(id = %id, "User updated");

        Ok(user)
    }
}

#[derive(Debug)]
pub struct DeleteUserUseCase<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> DeleteUserUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &UserId) -> Result<(), UserError> {
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(UserError::not_found(id.clone()));
        }

        self.repository.delete(id).await?;
        info!(id = %id, "User deleted");

        Ok(())
    }
}

/// The five user use-cases wired to one repository
#[derive(Debug)]
pub struct UserUseCases<R: UserRepository + ?Sized> {
    pub create: CreateUserUseCase<R>,
    pub get_all: GetAllUsersUseCase<R>,
    pub get_by_id: GetUserByIdUseCase<R>,
    pub update: UpdateUserUseCase<R>,
    pub delete: DeleteUserUseCase<R>,
}

impl<R: UserRepository + ?Sized> UserUseCases<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            create: CreateUserUseCase::new(repository.clone()),
            get_all: GetAllUsersUseCase::new(repository.clone()),
            get_by_id: GetUserByIdUseCase::new(repository.clone()),
            update: UpdateUserUseCase::new(repository.clone()),
            delete: DeleteUserUseCase::new(repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;

    use crate::domain::user::MockUserRepository;
    use crate::domain::DomainError;
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    fn create_use_cases() -> UserUseCases<InMemoryUserRepository> {
        UserUseCases::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn create_data(email: &str, first_name: &str, last_name: &str, age: i32) -> CreateUserData {
        CreateUserData {
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
        }
    }

    fn stored_user(id: &str, email: &str) -> User {
        let now = Utc::now();
        User::new(UserId::new(id), email, "Test", "User", 25, now, now)
    }

    #[tokio::test]
    async fn test_create_returns_input_fields() {
        let use_cases = create_use_cases();

        let user = use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        assert_eq!(user.email(), "a@x.com");
        assert_eq!(user.first_name(), "A");
        assert_eq!(user.last_name(), "B");
        assert_eq!(user.age(), 30);
        assert!(!user.id().as_str().is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let use_cases = create_use_cases();

        use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        let result = use_cases
            .create
            .execute(create_data("a@x.com", "Another", "User", 41))
            .await;

        match result {
            Err(UserError::DuplicateEmail { email }) => assert_eq!(email, "a@x.com"),
            other => panic!("expected DuplicateEmail, got {:?}", other),
        }

        let all = use_cases.get_all.execute().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_performs_no_write() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_email()
            .with(eq("a@x.com"))
            .returning(|email| Ok(Some(stored_user("u1", email))));
        mock.expect_create().never();

        let use_case = CreateUserUseCase::new(Arc::new(mock));
        let result = use_case.execute(create_data("a@x.com", "A", "B", 30)).await;

        assert!(matches!(result, Err(UserError::DuplicateEmail { .. })));
    }

    #[tokio::test]
    async fn test_create_propagates_store_conflict() {
        // Another request won the race between the lookup and the insert.
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_email().returning(|_| Ok(None));
        mock.expect_create()
            .times(1)
            .returning(|_| Err(DomainError::conflict("Email 'a@x.com' already exists")));

        let use_case = CreateUserUseCase::new(Arc::new(mock));
        let result = use_case.execute(create_data("a@x.com", "A", "B", 30)).await;

        assert!(matches!(
            result,
            Err(UserError::Repository(DomainError::Conflict { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_all_is_idempotent() {
        let use_cases = create_use_cases();

        use_cases
            .create
            .execute(create_data("one@x.com", "One", "User", 20))
            .await
            .unwrap();
        use_cases
            .create
            .execute(create_data("two@x.com", "Two", "User", 21))
            .await
            .unwrap();

        let first = use_cases.get_all.execute().await.unwrap();
        let second = use_cases.get_all.execute().await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(first[0].email(), "two@x.com");
    }

    #[tokio::test]
    async fn test_get_all_propagates_storage_failure() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_all()
            .returning(|| Err(DomainError::storage("connection refused")));

        let use_case = GetAllUsersUseCase::new(Arc::new(mock));
        let result = use_case.execute().await;

        assert!(matches!(
            result,
            Err(UserError::Repository(DomainError::Storage { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let use_cases = create_use_cases();
        let created = use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        let found = use_cases.get_by_id.execute(created.id()).await.unwrap();
        let again = use_cases.get_by_id.execute(created.id()).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(found, again);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let use_cases = create_use_cases();

        let result = use_cases
            .get_by_id
            .execute(&UserId::new("non-existent-id"))
            .await;

        match result {
            Err(UserError::NotFound { id }) => assert_eq!(id.as_str(), "non-existent-id"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_omitted_fields_unchanged() {
        let use_cases = create_use_cases();
        let created = use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        let updated = use_cases
            .update
            .execute(
                created.id(),
                UpdateUserData {
                    age: Some(31),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.age(), 31);
        assert_eq!(updated.email(), "a@x.com");
        assert_eq!(updated.first_name(), "A");
        assert_eq!(updated.last_name(), "B");
    }

    #[tokio::test]
    async fn test_update_empty_data_is_legal() {
        let use_cases = create_use_cases();
        let created = use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        let updated = use_cases
            .update
            .execute(created.id(), UpdateUserData::default())
            .await
            .unwrap();

        assert_eq!(updated.email(), created.email());
        assert_eq!(updated.age(), created.age());
        assert!(updated.updated_at() >= created.updated_at());
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let use_cases = create_use_cases();
        let u1 = use_cases
            .create
            .execute(create_data("e1@x.com", "One", "User", 20))
            .await
            .unwrap();
        use_cases
            .create
            .execute(create_data("e2@x.com", "Two", "User", 21))
            .await
            .unwrap();

        let result = use_cases
            .update
            .execute(
                u1.id(),
                UpdateUserData {
                    email: Some("e2@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(UserError::EmailConflict { email }) => assert_eq!(email, "e2@x.com"),
            other => panic!("expected EmailConflict, got {:?}", other),
        }

        let unchanged = use_cases.get_by_id.execute(u1.id()).await.unwrap();
        assert_eq!(unchanged.email(), "e1@x.com");
    }

    #[tokio::test]
    async fn test_update_email_conflict_performs_no_write() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Ok(Some(stored_user(id.as_str(), "e1@x.com"))));
        mock.expect_find_by_email()
            .with(eq("e2@x.com"))
            .returning(|email| Ok(Some(stored_user("u2", email))));
        mock.expect_update().never();

        let use_case = UpdateUserUseCase::new(Arc::new(mock));
        let result = use_case
            .execute(
                &UserId::new("u1"),
                UpdateUserData {
                    email: Some("e2@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(UserError::EmailConflict { .. })));
    }

    #[tokio::test]
    async fn test_update_own_email_skips_lookup() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Ok(Some(stored_user(id.as_str(), "e1@x.com"))));
        mock.expect_find_by_email().never();
        mock.expect_update()
            .times(1)
            .returning(|id, _| Ok(stored_user(id.as_str(), "e1@x.com")));

        let use_case = UpdateUserUseCase::new(Arc::new(mock));
        let result = use_case
            .execute(
                &UserId::new("u1"),
                UpdateUserData {
                    email: Some("e1@x.com".to_string()),
                    first_name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_email_is_case_sensitive() {
        let use_cases = create_use_cases();
        let created = use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        let updated = use_cases
            .update
            .execute(
                created.id(),
                UpdateUserData {
                    email: Some("A@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email(), "A@x.com");
    }

    #[tokio::test]
    async fn test_update_not_found_performs_no_write() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(None));
        mock.expect_find_by_email().never();
        mock.expect_update().never();

        let use_case = UpdateUserUseCase::new(Arc::new(mock));
        let result = use_case
            .execute(&UserId::new("missing"), UpdateUserData::default())
            .await;

        assert!(matches!(result, Err(UserError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let use_cases = create_use_cases();
        let created = use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        use_cases.delete.execute(created.id()).await.unwrap();

        let result = use_cases.delete.execute(created.id()).await;
        assert!(matches!(result, Err(UserError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_not_found_performs_no_write() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(None));
        mock.expect_delete().never();

        let use_case = DeleteUserUseCase::new(Arc::new(mock));
        let result = use_case.execute(&UserId::new("missing")).await;

        assert!(matches!(result, Err(UserError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_deleted_email_can_be_reused() {
        let use_cases = create_use_cases();
        let created = use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        use_cases.delete.execute(created.id()).await.unwrap();

        let recreated = use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        assert_ne!(recreated.id(), created.id());
    }

    #[tokio::test]
    async fn test_works_with_dynamic_repository() {
        let repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let use_cases = UserUseCases::new(repository);

        let created = use_cases
            .create
            .execute(create_data("a@x.com", "A", "B", 30))
            .await
            .unwrap();

        assert_eq!(use_cases.get_all.execute().await.unwrap(), vec![created]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_logs_never_contain_email_addresses() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(async {
                    let use_cases = create_use_cases();
                    let first = use_cases
                        .create
                        .execute(create_data("first@x.com", "A", "B", 30))
                        .await
                        .unwrap();
                    use_cases
                        .create
                        .execute(create_data("second@x.com", "C", "D", 40))
                        .await
                        .unwrap();

                    let duplicate = use_cases
                        .create
                        .execute(create_data("first@x.com", "E", "F", 50))
                        .await;
                    assert!(duplicate.is_err());

                    let conflict = use_cases
                        .update
                        .execute(
                            first.id(),
                            UpdateUserData {
                                email: Some("second@x.com".to_string()),
                                ..Default::default()
                            },
                        )
                        .await;
                    assert!(conflict.is_err());
                });
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("User created"));
        assert!(output.contains("Rejected user update"));
        assert!(!output.contains("first@x.com"));
        assert!(!output.contains("second@x.com"));
    }
}
