use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    application::user_service::UserService,
    domain::{events::ClerkEvent, user::User},
    shared::errors::{DomainError, SyncOperation},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced(User),
    Ignored,
}

#[derive(Error, Debug)]
#[error("error {operation} user: {source}")]
pub struct SyncError {
    pub operation: SyncOperation,
    #[source]
    pub source: DomainError,
}

impl SyncError {
    fn wrap(operation: SyncOperation) -> impl FnOnce(DomainError) -> Self {
        move |source| Self { operation, source }
    }
}

/// Applies a verified Clerk event to the local user table.
pub struct WebhookService {
    users: Arc<UserService>,
}

impl WebhookService {
    pub fn new(users: Arc<UserService>) -> Self {
        Self { users }
    }

    pub async fn sync(&self, event: ClerkEvent) -> Result<SyncOutcome, SyncError> {
        match event {
            ClerkEvent::UserCreated(data) => {
                let user = self
                    .users
                    .create_user(data.to_create_command())
                    .await
                    .map_err(SyncError::wrap(SyncOperation::Create))?;
                info!(clerk_id = %user.clerk_id, user_id = %user.id, "User created");

                self.users.link_identity(&user).await;
                Ok(SyncOutcome::Synced(user))
            }
            ClerkEvent::UserUpdated(data) => {
                let user = self
                    .users
                    .update_user(&data.id, data.to_update_command())
                    .await
                    .map_err(SyncError::wrap(SyncOperation::Update))?;
                info!(clerk_id = %user.clerk_id, user_id = %user.id, "User updated");
                Ok(SyncOutcome::Synced(user))
            }
            ClerkEvent::UserDeleted { clerk_id } => {
                let user = self
                    .users
                    .delete_user(&clerk_id)
                    .await
                    .map_err(SyncError::wrap(SyncOperation::Delete))?;
                info!(clerk_id = %user.clerk_id, user_id = %user.id, "User deleted");
                Ok(SyncOutcome::Synced(user))
            }
            ClerkEvent::Unrecognized { event_type, clerk_id } => {
                warn!(%clerk_id, "Unhandled webhook event type: {event_type}");
                Ok(SyncOutcome::Ignored)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::{
        identity::IdentityProvider,
        user::{CreateUserCommand, UpdateUserCommand, UserRepository},
    };

    struct UntouchedStore;

    #[async_trait]
    impl UserRepository for UntouchedStore {
        async fn create(&self, _cmd: CreateUserCommand) -> Result<User, DomainError> {
            panic!("create must not run");
        }

        async fn update_by_clerk_id(
            &self,
            _clerk_id: &str,
            _cmd: UpdateUserCommand,
        ) -> Result<User, DomainError> {
            panic!("update must not run");
        }

        async fn delete_by_clerk_id(&self, _clerk_id: &str) -> Result<User, DomainError> {
            panic!("delete must not run");
        }
    }

    #[async_trait]
    impl IdentityProvider for UntouchedStore {
        async fn update_public_metadata(
            &self,
            _clerk_id: &str,
            _metadata: serde_json::Value,
        ) -> Result<(), DomainError> {
            panic!("metadata must not be written");
        }
    }

    #[tokio::test]
    async fn unrecognized_event_is_ignored_without_side_effects() {
        let users = Arc::new(UserService::new(
            Arc::new(UntouchedStore),
            Arc::new(UntouchedStore),
        ));
        let service = WebhookService::new(users);

        let outcome = service
            .sync(ClerkEvent::Unrecognized {
                event_type: "organization.created".into(),
                clerk_id: "org_1".into(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Ignored);
    }
}
