use std::sync::Arc;

use crate::{
    application::{user_service::UserService, webhook_service::WebhookService},
    infrastructure::svix::SvixVerifier,
};

#[derive(Clone)]
pub struct AppState {
    /// `None` when no signing secret is configured; the webhook route then fails closed.
    pub verifier: Option<Arc<SvixVerifier>>,
    pub webhook_service: Arc<WebhookService>,
}

impl AppState {
    pub fn new(verifier: Option<Arc<SvixVerifier>>, user_service: Arc<UserService>) -> Self {
        Self {
            verifier,
            webhook_service: Arc::new(WebhookService::new(user_service)),
        }
    }
}

pub type SharedState = Arc<AppState>;
