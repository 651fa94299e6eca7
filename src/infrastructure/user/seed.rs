//! Sample data for local development

use tracing::info;

use crate::domain::user::{CreateUserData, User, UserError, UserRepository};

/// Users created by the `seed` command
pub fn sample_users() -> Vec<CreateUserData> {
    [
        ("john.doe@example.com", "John", "Doe", 30),
        ("jane.smith@example.com", "Jane", "Smith", 25),
        ("bob.johnson@example.com", "Bob", "Johnson", 35),
    ]
    .into_iter()
    .map(|(email, first_name, last_name, age)| CreateUserData {
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        age,
    })
    .collect()
}

/// Remove every existing user, then insert the sample users
pub async fn seed_users<R: UserRepository + ?Sized>(repository: &R) -> Result<Vec<User>, UserError> {
    let existing = repository.find_all().await?;
    info!(count = existing.len(), "Clearing existing users");

    for user in &existing {
        repository.delete(user.id()).await?;
    }

    let mut created = Vec::new();

    for data in sample_users() {
        created.push(repository.create(data).await?);
    }

    info!(count = created.len(), "Seeded users");

    Ok(created)
}
