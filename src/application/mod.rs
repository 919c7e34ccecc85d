pub mod user_service;
pub mod webhook_service;
