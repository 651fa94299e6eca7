//! User domain
//!
//! Domain types for the user resource: the immutable entity, the
//! repository port consumed by the use-cases, and the use-case error kinds.

mod entity;
mod error;
mod repository;

pub use entity::{User, UserId};
pub use error::UserError;
pub use repository::{CreateUserData, UpdateUserData, UserRepository};

#[cfg(test)]
pub use repository::MockUserRepository;
