use anyhow::bail;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::debug;

use crate::{config::ClerkConfig, domain::identity::IdentityProvider, shared::errors::DomainError};

/// Backend API client for the one Clerk call the sync makes.
pub struct ClerkClient {
    http: Client,
    api_url: Url,
    secret_key: String,
}

impl ClerkClient {
    pub fn new(cfg: &ClerkConfig, secret_key: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(cfg.timeout())
            .user_agent(concat!("identity-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let api_url = Url::parse(&cfg.api_url)?;
        if api_url.cannot_be_a_base() {
            bail!("clerk api_url `{}` cannot carry a path", cfg.api_url);
        }

        Ok(Self {
            http,
            api_url,
            secret_key,
        })
    }

    /// `{api_url}/users/{clerk_id}/metadata`, with `clerk_id` encoded as a single segment.
    fn metadata_url(&self, clerk_id: &str) -> Url {
        let mut url = self.api_url.clone();
        // `new` rejects cannot-be-a-base urls, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["users", clerk_id, "metadata"]);
        }
        url
    }
}

#[derive(Serialize)]
struct MetadataPatch {
    public_metadata: serde_json::Value,
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn update_public_metadata(
        &self,
        clerk_id: &str,
        metadata: serde_json::Value,
    ) -> Result<(), DomainError> {
        debug!(clerk_id, "Updating Clerk public metadata");

        let response = self
            .http
            .patch(self.metadata_url(clerk_id))
            .bearer_auth(&self.secret_key)
            .json(&MetadataPatch {
                public_metadata: metadata,
            })
            .send()
            .await
            .map_err(|e| DomainError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Unexpected(format!(
                "clerk responded {status}: {body}"
            )));
        }

        Ok(())
    }
}

/// Stand-in used when no Clerk secret key is configured. Every write fails, which
/// the metadata link treats as a logged, non-fatal miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredClerk;

#[async_trait]
impl IdentityProvider for UnconfiguredClerk {
    async fn update_public_metadata(
        &self,
        _clerk_id: &str,
        _metadata: serde_json::Value,
    ) -> Result<(), DomainError> {
        Err(DomainError::Unexpected(
            "clerk secret key is not configured".to_string(),
        ))
    }
}
