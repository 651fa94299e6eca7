//! User resource endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::api::validation::validate_request;
use crate::domain::user::{CreateUserData, UpdateUserData, User, UserError, UserId};
use crate::domain::DomainError;

/// Request to create a new user
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(email(message = "email must be an email"))]
    pub email: String,
    #[validate(length(min = 1, message = "firstName should not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "lastName should not be empty"))]
    pub last_name: String,
    #[validate(range(min = 0, message = "age must not be less than 0"))]
    pub age: i32,
}

impl From<CreateUserRequest> for CreateUserData {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            age: request.age,
        }
    }
}

/// Request to update a user; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(email(message = "email must be an email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "firstName should not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "lastName should not be empty"))]
    pub last_name: Option<String>,
    #[validate(range(min = 0, message = "age must not be less than 0"))]
    pub age: Option<i32>,
}

impl From<UpdateUserRequest> for UpdateUserData {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            age: request.age,
        }
    }
}

/// User as returned on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            email: user.email().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            age: user.age(),
            created_at: user.created_at().to_rfc3339_opts(SecondsFormat::Millis, true),
            updated_at: user.updated_at().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Maps errors from operations that answer 400 for every rejection (create, update)
fn rejection_to_bad_request(err: UserError) -> ApiError {
    match err {
        UserError::DuplicateEmail { .. } => {
            ApiError::bad_request(err.to_string()).with_code("duplicate_email")
        }
        UserError::EmailConflict { .. } => {
            ApiError::bad_request(err.to_string()).with_code("email_conflict")
        }
        UserError::NotFound { .. } => {
            ApiError::bad_request(err.to_string()).with_code("user_not_found")
        }
        UserError::Repository(DomainError::NotFound { message }) => {
            ApiError::bad_request(message).with_code("user_not_found")
        }
        UserError::Repository(domain) => ApiError::from(domain),
    }
}

/// Maps errors from operations addressing an existing user (get, delete)
fn rejection_to_not_found(err: UserError) -> ApiError {
    match err {
        UserError::NotFound { .. } => {
            ApiError::not_found(err.to_string()).with_code("user_not_found")
        }
        UserError::DuplicateEmail { .. } | UserError::EmailConflict { .. } => {
            ApiError::bad_request(err.to_string())
        }
        UserError::Repository(domain) => ApiError::from(domain),
    }
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!("Creating user");

    validate_request(&request).map_err(ApiError::validation)?;

    let user = state
        .user_service
        .create(request.into())
        .await
        .map_err(rejection_to_bad_request)?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    debug!("Listing users");

    let users = state
        .user_service
        .list()
        .await
        .map_err(rejection_to_not_found)?;

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(id = %id, "Getting user");

    let user = state
        .user_service
        .get(&UserId::new(id))
        .await
        .map_err(rejection_to_not_found)?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(id = %id, "Updating user");

    validate_request(&request).map_err(ApiError::validation)?;

    let user = state
        .user_service
        .update(&UserId::new(id), request.into())
        .await
        .map_err(rejection_to_bad_request)?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(id = %id, "Deleting user");

    state
        .user_service
        .delete(&UserId::new(id))
        .await
        .map_err(rejection_to_not_found)?;

    Ok(StatusCode::NO_CONTENT)
}
