use crate::{
    builder::EnqueueTokenBuilder,
    decoder::EnqueueTokenDecoder,
    error::TokenError,
    payload::EnqueueTokenPayload,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// A signed enqueue token.
///
/// Tokens are produced either by [`EnqueueTokenBuilder::generate`] or by [`EnqueueToken::parse`],
/// and are immutable from then on.
#[derive(Clone, Debug, PartialEq)]
pub struct EnqueueToken {
    pub(crate) token_identifier: String,
    pub(crate) customer_id: String,
    pub(crate) event_id: Option<String>,
    pub(crate) ip_address: Option<String>,
    pub(crate) issued: DateTime<Utc>,
    pub(crate) expires: Option<DateTime<Utc>>,
    pub(crate) payload: Option<Arc<EnqueueTokenPayload>>,
    pub(crate) token: String,
    pub(crate) signature: String,
}

impl EnqueueToken {
    /// Start building a token for the given customer.
    pub fn builder<S: Into<String>>(customer_id: S) -> EnqueueTokenBuilder {
        EnqueueTokenBuilder::new(customer_id)
    }

    /// Parse and verify a signed token using the default decoder.
    pub fn parse(input: &str, secret_key: &str) -> Result<Self, TokenError> {
        EnqueueTokenDecoder::default().decode(input, secret_key)
    }

    /// The unique identifier of this token.
    pub fn token_identifier(&self) -> &str {
        &self.token_identifier
    }

    /// The customer this token was issued for.
    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// The event this token gives access to, if any.
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    /// The client IP this token is bound to, if any.
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// The time this token was issued at, with millisecond precision.
    pub fn issued(&self) -> DateTime<Utc> {
        self.issued
    }

    /// The time this token expires at, or `None` if it never does.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Check whether this token is expired at the given time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// The token payload, if any.
    pub fn payload(&self) -> Option<&EnqueueTokenPayload> {
        self.payload.as_deref()
    }

    /// The token format version.
    pub fn version(&self) -> TokenVersion {
        TokenVersion::Qt1
    }

    /// The payload encryption used.
    pub fn encryption(&self) -> EncryptionType {
        EncryptionType::Aes256
    }

    /// The `header.payload` part of the token that the signature covers.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The base64url encoded signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The full token as handed out to clients.
    pub fn signed_token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EnqueueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { token, signature, .. } = self;
        write!(f, "{token}.{signature}")
    }
}

/// The version of the token format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenVersion {
    #[serde(rename = "QT1")]
    Qt1,
}

/// The encryption used for the token payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncryptionType {
    #[serde(rename = "AES256")]
    Aes256,
}
