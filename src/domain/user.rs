use std::fmt::Display;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row of the application's own user table, linked to its Clerk identity
/// through `clerk_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub clerk_id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, cmd: CreateUserCommand) -> Result<User, DomainError>;
    /// Fails with [`DomainError::UserNotFound`] when no row carries `clerk_id`.
    async fn update_by_clerk_id(
        &self,
        clerk_id: &str,
        cmd: UpdateUserCommand,
    ) -> Result<User, DomainError>;
    /// Returns the row as it was before removal.
    async fn delete_by_clerk_id(&self, clerk_id: &str) -> Result<User, DomainError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserCommand {
    pub clerk_id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: String,
}

/// Profile fields refreshed on `user.updated`. Email is owned by the create path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserCommand {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub photo: String,
}
