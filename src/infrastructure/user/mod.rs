//! User infrastructure module
//!
//! Use-case orchestration for the user resource plus the two repository
//! adapters: in-memory and PostgreSQL.

mod postgres_repository;
mod repository;
mod seed;
mod use_cases;

pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use seed::{sample_users, seed_users};
pub use use_cases::{
    CreateUserUseCase, DeleteUserUseCase, GetAllUsersUseCase, GetUserByIdUseCase,
    UpdateUserUseCase, UserUseCases,
};
