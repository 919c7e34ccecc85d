use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::info;

use crate::{
    application::webhook_service::SyncOutcome,
    domain::{
        events::{ClerkEvent, WebhookEnvelope},
        user::User,
    },
    interfaces::http::extractors::SignedDelivery,
    shared::errors::ApiError,
    state::SharedState,
};

#[derive(Serialize)]
pub struct SyncResponse {
    pub message: &'static str,
    pub user: User,
}

/// `POST /api/webhooks/clerk`
///
/// The body is parsed before it is verified, but verification always runs over
/// the bytes exactly as received.
pub async fn receive_clerk_webhook(
    State(state): State<SharedState>,
    delivery: SignedDelivery,
    body: Bytes,
) -> Result<Response, ApiError> {
    let envelope: WebhookEnvelope = serde_json::from_slice(&body)?;

    delivery.verifier.verify(&body, &delivery.headers())?;

    let event = ClerkEvent::classify(envelope)?;
    info!(
        event_type = event.event_type(),
        clerk_id = event.clerk_id(),
        "Processing webhook event"
    );

    let response = match state.webhook_service.sync(event).await? {
        SyncOutcome::Synced(user) => Json(SyncResponse {
            message: "OK",
            user,
        })
        .into_response(),
        SyncOutcome::Ignored => (StatusCode::OK, "Event received").into_response(),
    };

    Ok(response)
}
