//! Svix webhook signature verification.
//!
//! Clerk delivers webhooks through Svix. Each delivery carries three headers:
//! `svix-id`, `svix-timestamp` (unix seconds) and `svix-signature`, a
//! space-separated list of `v1,<base64 hmac>` entries. The HMAC-SHA256 is taken
//! over `"{id}.{timestamp}.{raw body}"` with the base64-decoded signing secret.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::shared::errors::VerificationError;

type HmacSha256 = Hmac<Sha256>;

pub const ID_HEADER: &str = "svix-id";
pub const TIMESTAMP_HEADER: &str = "svix-timestamp";
pub const SIGNATURE_HEADER: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

#[derive(Debug, Clone, Copy)]
pub struct SignatureHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

pub struct SvixVerifier {
    key: Vec<u8>,
    tolerance_seconds: i64,
}

impl std::fmt::Debug for SvixVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvixVerifier")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish_non_exhaustive()
    }
}

impl SvixVerifier {
    /// Accepts the secret as shown in the Clerk dashboard (`whsec_...`) or the
    /// bare base64 part.
    pub fn new(secret: &str, tolerance_seconds: i64) -> Result<Self, VerificationError> {
        let encoded = secret.trim();
        let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| VerificationError::InvalidSecret)?;

        if key.is_empty() {
            return Err(VerificationError::InvalidSecret);
        }

        Ok(Self {
            key,
            tolerance_seconds,
        })
    }

    pub fn verify(
        &self,
        payload: &[u8],
        headers: &SignatureHeaders<'_>,
    ) -> Result<(), VerificationError> {
        self.verify_at(payload, headers, Utc::now())
    }

    pub fn verify_at(
        &self,
        payload: &[u8],
        headers: &SignatureHeaders<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        let timestamp = headers
            .timestamp
            .trim()
            .parse::<i64>()
            .map_err(|_| VerificationError::InvalidTimestamp)?;

        let now = now.timestamp();
        if now.saturating_sub(timestamp) > self.tolerance_seconds
            || timestamp.saturating_sub(now) > self.tolerance_seconds
        {
            return Err(VerificationError::TimestampOutOfTolerance);
        }

        let expected = self.compute(headers.id, timestamp, payload);

        let mut saw_candidate = false;
        for entry in headers.signature.split_whitespace() {
            let Some((version, encoded)) = entry.split_once(',') else {
                continue;
            };
            if version != SIGNATURE_VERSION {
                continue;
            }
            saw_candidate = true;

            let Ok(provided) = STANDARD.decode(encoded) else {
                continue;
            };
            if constant_time_compare(&expected, &provided) {
                return Ok(());
            }
        }

        if saw_candidate {
            tracing::debug!("Webhook signature verification failed");
            Err(VerificationError::NoMatchingSignature)
        } else {
            Err(VerificationError::MalformedSignatureHeader)
        }
    }

    /// Produces a `svix-signature` header value for `payload`.
    pub fn sign(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> String {
        let signature = STANDARD.encode(self.compute(msg_id, timestamp, payload));
        format!("{SIGNATURE_VERSION},{signature}")
    }

    fn compute(&self, msg_id: &str, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length, and `new` rejects the empty key.
        let mut mac = match HmacSha256::new_from_slice(&self.key) {
            Ok(mac) => mac,
            Err(_) => return Vec::new(),
        };
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.is_empty() || a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
