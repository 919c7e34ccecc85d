use async_trait::async_trait;

use crate::shared::errors::DomainError;

/// Write access to the identity provider's own user records.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Merges `metadata` into the public metadata of the external user `clerk_id`.
    async fn update_public_metadata(
        &self,
        clerk_id: &str,
        metadata: serde_json::Value,
    ) -> Result<(), DomainError>;
}
