//! Inbound Clerk webhook events.
//!
//! Deliveries arrive as a loose `{ "type": ..., "data": ... }` envelope. They are
//! classified into [`ClerkEvent`] only after the external id has been checked, so
//! every variant carries a non-empty `clerk_id`.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::user::{CreateUserCommand, UpdateUserCommand};

pub const USER_CREATED: &str = "user.created";
pub const USER_UPDATED: &str = "user.updated";
pub const USER_DELETED: &str = "user.deleted";

#[derive(Error, Debug)]
pub enum EventError {
    #[error("event data has no id")]
    MissingId,
    #[error("malformed event data: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WebhookEnvelope {
    pub fn clerk_id(&self) -> Option<&str> {
        self.data
            .get("id")
            .and_then(serde_json::Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClerkEvent {
    UserCreated(ClerkUserData),
    UserUpdated(ClerkUserData),
    UserDeleted { clerk_id: String },
    Unrecognized { event_type: String, clerk_id: String },
}

impl ClerkEvent {
    pub fn classify(envelope: WebhookEnvelope) -> Result<Self, EventError> {
        let clerk_id = envelope
            .clerk_id()
            .map(str::to_owned)
            .ok_or(EventError::MissingId)?;

        let event = match envelope.event_type.as_str() {
            USER_CREATED => ClerkEvent::UserCreated(serde_json::from_value(envelope.data)?),
            USER_UPDATED => ClerkEvent::UserUpdated(serde_json::from_value(envelope.data)?),
            USER_DELETED => ClerkEvent::UserDeleted { clerk_id },
            _ => ClerkEvent::Unrecognized {
                event_type: envelope.event_type,
                clerk_id,
            },
        };

        Ok(event)
    }

    pub fn clerk_id(&self) -> &str {
        match self {
            ClerkEvent::UserCreated(data) | ClerkEvent::UserUpdated(data) => &data.id,
            ClerkEvent::UserDeleted { clerk_id } | ClerkEvent::Unrecognized { clerk_id, .. } => {
                clerk_id
            }
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            ClerkEvent::UserCreated(_) => USER_CREATED,
            ClerkEvent::UserUpdated(_) => USER_UPDATED,
            ClerkEvent::UserDeleted { .. } => USER_DELETED,
            ClerkEvent::Unrecognized { event_type, .. } => event_type,
        }
    }
}

/// The subset of Clerk's user object the sync needs. Clerk sends `null` for
/// unset profile fields, so everything but `id` is optional here and defaulted
/// to an empty string when projected into a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClerkUserData {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Option<Vec<ClerkEmailAddress>>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClerkEmailAddress {
    #[serde(default)]
    pub email_address: Option<String>,
}

impl ClerkUserData {
    pub fn first_email(&self) -> String {
        self.email_addresses
            .as_deref()
            .and_then(|list| list.first())
            .and_then(|e| e.email_address.clone())
            .unwrap_or_default()
    }

    pub fn to_create_command(&self) -> CreateUserCommand {
        CreateUserCommand {
            clerk_id: self.id.clone(),
            email: self.first_email(),
            username: self.username.clone().unwrap_or_default(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            photo: self.image_url.clone().unwrap_or_default(),
        }
    }

    pub fn to_update_command(&self) -> UpdateUserCommand {
        UpdateUserCommand {
            username: self.username.clone().unwrap_or_default(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            photo: self.image_url.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn envelope(value: serde_json::Value) -> WebhookEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn created_event_defaults_absent_fields_to_empty() {
        let event = ClerkEvent::classify(envelope(json!({
            "type": "user.created",
            "data": {
                "id": "ext_1",
                "email_addresses": [{ "email_address": "a@b.com" }],
                "username": "bob"
            }
        })))
        .unwrap();

        let ClerkEvent::UserCreated(data) = event else {
            panic!("expected user.created");
        };
        assert_eq!(
            data.to_create_command(),
            CreateUserCommand {
                clerk_id: "ext_1".into(),
                email: "a@b.com".into(),
                username: "bob".into(),
                first_name: String::new(),
                last_name: String::new(),
                photo: String::new(),
            }
        );
    }

    #[test]
    fn null_fields_and_empty_email_list_become_empty_strings() {
        let event = ClerkEvent::classify(envelope(json!({
            "type": "user.created",
            "data": {
                "id": "ext_1",
                "email_addresses": [],
                "username": null,
                "first_name": null,
                "image_url": null
            }
        })))
        .unwrap();

        let ClerkEvent::UserCreated(data) = event else {
            panic!("expected user.created");
        };
        let cmd = data.to_create_command();
        assert_eq!(cmd.email, "");
        assert_eq!(cmd.username, "");
        assert_eq!(cmd.first_name, "");
        assert_eq!(cmd.photo, "");
    }

    #[test]
    fn first_email_wins() {
        let data: ClerkUserData = serde_json::from_value(json!({
            "id": "ext_1",
            "email_addresses": [
                { "email_address": "first@example.com" },
                { "email_address": "second@example.com" }
            ]
        }))
        .unwrap();
        assert_eq!(data.first_email(), "first@example.com");
    }

    #[test]
    fn updated_event_maps_profile_fields() {
        let event = ClerkEvent::classify(envelope(json!({
            "type": "user.updated",
            "data": {
                "id": "ext_9",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "image_url": "https://img.example/ada.png",
                "email_addresses": [{ "email_address": "ignored@example.com" }]
            }
        })))
        .unwrap();

        let ClerkEvent::UserUpdated(data) = event else {
            panic!("expected user.updated");
        };
        assert_eq!(
            data.to_update_command(),
            UpdateUserCommand {
                username: String::new(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                photo: "https://img.example/ada.png".into(),
            }
        );
    }

    #[test]
    fn deleted_event_only_needs_id() {
        let event = ClerkEvent::classify(envelope(json!({
            "type": "user.deleted",
            "data": { "id": "ext_2", "deleted": true, "object": "user" }
        })))
        .unwrap();
        assert_eq!(
            event,
            ClerkEvent::UserDeleted {
                clerk_id: "ext_2".into()
            }
        );
    }

    #[test]
    fn unknown_types_are_kept_not_rejected() {
        let event = ClerkEvent::classify(envelope(json!({
            "type": "session.created",
            "data": { "id": "sess_1" }
        })))
        .unwrap();
        assert_eq!(event.event_type(), "session.created");
        assert_eq!(event.clerk_id(), "sess_1");
    }

    #[test]
    fn type_match_is_exact() {
        let event = ClerkEvent::classify(envelope(json!({
            "type": "User.Created",
            "data": { "id": "ext_1" }
        })))
        .unwrap();
        assert!(matches!(event, ClerkEvent::Unrecognized { .. }));
    }

    #[test]
    fn missing_or_empty_id_is_rejected() {
        for data in [json!({}), json!({ "id": "" }), json!({ "id": null }), json!({ "id": 7 })] {
            let result = ClerkEvent::classify(envelope(json!({
                "type": "user.created",
                "data": data
            })));
            assert!(matches!(result, Err(EventError::MissingId)));
        }
    }

    #[test]
    fn mistyped_profile_field_is_a_payload_error() {
        let result = ClerkEvent::classify(envelope(json!({
            "type": "user.updated",
            "data": { "id": "ext_1", "first_name": 42 }
        })));
        assert!(matches!(result, Err(EventError::Payload(_))));
    }
}
