//! Errors surfaced by the user use-cases

use thiserror::Error;

use super::entity::UserId;
use crate::domain::DomainError;

/// Failure of a user use-case.
///
/// The first three variants are business-rule rejections; `Repository`
/// carries any port failure through unchanged.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with this email already exists")]
    DuplicateEmail { email: String },

    #[error("Email already in use")]
    EmailConflict { email: String },

    #[error("User not found")]
    NotFound { id: UserId },

    #[error(transparent)]
    Repository(#[from] DomainError),
}

impl UserError {
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    pub fn email_conflict(email: impl Into<String>) -> Self {
        Self::EmailConflict {
            email: email.into(),
        }
    }

    pub fn not_found(id: UserId) -> Self {
        Self::NotFound { id }
    }
}
