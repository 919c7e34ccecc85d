use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracing::error;

use crate::{
    infrastructure::svix::{
        ID_HEADER, SIGNATURE_HEADER, SignatureHeaders, SvixVerifier, TIMESTAMP_HEADER,
    },
    shared::errors::ApiError,
    state::SharedState,
};

/// The Svix header triple of a delivery, paired with the verifier that must check it.
///
/// Rejects with a 500 when no signing secret is configured, before looking at the
/// headers, and with a 400 when any header is absent, empty or not UTF-8.
pub struct SignedDelivery {
    pub verifier: Arc<SvixVerifier>,
    id: String,
    timestamp: String,
    signature: String,
}

impl SignedDelivery {
    pub fn headers(&self) -> SignatureHeaders<'_> {
        SignatureHeaders {
            id: &self.id,
            timestamp: &self.timestamp,
            signature: &self.signature,
        }
    }
}

#[async_trait]
impl FromRequestParts<SharedState> for SignedDelivery {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(verifier) = state.verifier.clone() else {
            error!("Missing webhook signing secret, set WEBHOOK_SECRET");
            return Err(ApiError::Internal);
        };

        let headers = &parts.headers;
        match (
            header_value(headers, ID_HEADER),
            header_value(headers, TIMESTAMP_HEADER),
            header_value(headers, SIGNATURE_HEADER),
        ) {
            (Some(id), Some(timestamp), Some(signature)) => Ok(Self {
                verifier,
                id: id.to_owned(),
                timestamp: timestamp.to_owned(),
                signature: signature.to_owned(),
            }),
            _ => {
                error!("Missing svix headers");
                Err(ApiError::MissingSignatureHeaders)
            }
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}
