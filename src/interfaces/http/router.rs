use std::any::Any;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use crate::{shared::errors::ApiError, state::SharedState};

use super::handlers::{health, webhooks};

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/webhooks/clerk", post(webhooks::receive_clerk_webhook))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Error handling webhook: handler panicked");
    ApiError::Internal.into_response()
}
