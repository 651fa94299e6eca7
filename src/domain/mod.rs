//! Domain layer - Core business entities and ports

pub mod error;
pub mod user;

pub use error::DomainError;
pub use user::{CreateUserData, UpdateUserData, User, UserError, UserId, UserRepository};
