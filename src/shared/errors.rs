use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::webhook_service::SyncError, domain::events::EventError};

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("user not found")]
    UserNotFound,
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Why a Svix delivery was rejected. Never echoed back to the caller.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("signing secret is not valid base64")]
    InvalidSecret,
    #[error("timestamp header is not a unix timestamp")]
    InvalidTimestamp,
    #[error("timestamp is outside the tolerance window")]
    TimestampOutOfTolerance,
    #[error("signature header carries no v1 signatures")]
    MalformedSignatureHeader,
    #[error("no signature matched")]
    NoMatchingSignature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl Display for SyncOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self {
            SyncOperation::Create => "creating",
            SyncOperation::Update => "updating",
            SyncOperation::Delete => "deleting",
        };
        write!(f, "{verb}")
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Error occurred -- no svix headers")]
    MissingSignatureHeaders,
    #[error("Error occurred")]
    VerificationFailed,
    #[error("Error occurred -- missing ID")]
    MissingId,
    #[error("Error {0} user")]
    SyncFailed(SyncOperation),
    #[error("Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingSignatureHeaders | ApiError::VerificationFailed | ApiError::MissingId => {
                StatusCode::BAD_REQUEST
            }
            ApiError::SyncFailed(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        tracing::error!("Error verifying webhook: {err}");
        ApiError::VerificationFailed
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::MissingId => {
                tracing::error!("Missing ID in event data");
                ApiError::MissingId
            }
            EventError::Payload(err) => err.into(),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        tracing::error!("Error {} user: {}", err.operation, err.source);
        ApiError::SyncFailed(err.operation)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("Error handling webhook: {err}");
        ApiError::Internal
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Internal error: {err:?}");
        ApiError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(ApiError::MissingSignatureHeaders.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::VerificationFailed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingId.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn sync_failures_name_the_operation() {
        let err = ApiError::SyncFailed(SyncOperation::Create);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Error creating user");
        assert_eq!(
            ApiError::SyncFailed(SyncOperation::Update).to_string(),
            "Error updating user"
        );
        assert_eq!(
            ApiError::SyncFailed(SyncOperation::Delete).to_string(),
            "Error deleting user"
        );
    }

    #[test]
    fn verification_detail_is_not_leaked() {
        let err: ApiError = VerificationError::TimestampOutOfTolerance.into();
        assert_eq!(err.to_string(), "Error occurred");
    }

    #[test]
    fn missing_id_is_a_client_error() {
        let err: ApiError = EventError::MissingId.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Error occurred -- missing ID");
    }

    #[test]
    fn failed_sync_keeps_operation_label() {
        let err: ApiError = SyncError {
            operation: SyncOperation::Delete,
            source: DomainError::UserNotFound,
        }
        .into();
        assert!(matches!(err, ApiError::SyncFailed(SyncOperation::Delete)));
    }

    #[test]
    fn malformed_json_becomes_generic_internal() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ApiError = parse.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn anyhow_errors_become_generic_internal() {
        let err: ApiError = anyhow::anyhow!("pool timed out").into();
        assert!(matches!(err, ApiError::Internal));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal Server Error");
    }
}
