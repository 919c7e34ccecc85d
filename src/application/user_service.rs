use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::{
    domain::{
        identity::IdentityProvider,
        user::{CreateUserCommand, UpdateUserCommand, User, UserRepository},
    },
    shared::errors::DomainError,
};

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { repo, identity }
    }

    pub async fn create_user(&self, cmd: CreateUserCommand) -> Result<User, DomainError> {
        self.repo.create(cmd).await
    }

    pub async fn update_user(
        &self,
        clerk_id: &str,
        cmd: UpdateUserCommand,
    ) -> Result<User, DomainError> {
        self.repo.update_by_clerk_id(clerk_id, cmd).await
    }

    pub async fn delete_user(&self, clerk_id: &str) -> Result<User, DomainError> {
        self.repo.delete_by_clerk_id(clerk_id).await
    }

    /// Records the internal id on the external identity so the frontend can
    /// resolve it from the session. Failures are logged and swallowed: the row
    /// already exists, and failing the delivery would only make Clerk retry the
    /// create against a duplicate `clerk_id`.
    pub async fn link_identity(&self, user: &User) {
        let metadata = json!({ "userId": user.id });
        match self
            .identity
            .update_public_metadata(&user.clerk_id, metadata)
            .await
        {
            Ok(()) => info!(
                clerk_id = %user.clerk_id,
                user_id = %user.id,
                "Linked external identity to user"
            ),
            Err(err) => warn!(
                clerk_id = %user.clerk_id,
                user_id = %user.id,
                error = %err,
                "Failed to write user id into identity metadata"
            ),
        }
    }
}
