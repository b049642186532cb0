use crate::{
    codec::HeaderFields,
    encryption::PayloadCipher,
    error::{MalformedToken, TokenError},
    payload::EnqueueTokenPayload,
    signer::{Sha256Signer, Signer},
    token::{EncryptionType, EnqueueToken, TokenVersion},
};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use std::{sync::Arc, time::Duration};
use tracing::debug;
use uuid::Uuid;

/// An enqueue token builder.
///
/// Every setter consumes the builder and returns the updated one. Cloning a builder is cheap as
/// the payload is shared between clones, and changes made to a clone never affect the original.
#[derive(Clone, Debug)]
pub struct EnqueueTokenBuilder {
    customer_id: String,
    event_id: Option<String>,
    ip_address: Option<String>,
    issued: DateTime<Utc>,
    expires: Option<DateTime<Utc>>,
    payload: Option<Arc<EnqueueTokenPayload>>,
    token_identifier: Option<String>,
    token_identifier_prefix: Option<String>,
}

impl EnqueueTokenBuilder {
    /// Construct a new builder for the given customer, issued at the current time.
    pub fn new<S: Into<String>>(customer_id: S) -> Self {
        Self {
            customer_id: customer_id.into(),
            event_id: Default::default(),
            ip_address: Default::default(),
            issued: Utc::now().trunc_subsecs(3),
            expires: Default::default(),
            payload: Default::default(),
            token_identifier: Default::default(),
            token_identifier_prefix: Default::default(),
        }
    }

    /// Create a new builder using the given token as a base.
    ///
    /// All fields are carried over, including the issue time and the token identifier, so
    /// generating it with the same secret key yields the same signed token.
    pub fn extending(token: &EnqueueToken) -> Self {
        Self {
            customer_id: token.customer_id.clone(),
            event_id: token.event_id.clone(),
            ip_address: token.ip_address.clone(),
            issued: token.issued,
            expires: token.expires,
            payload: token.payload.clone(),
            token_identifier: Some(token.token_identifier.clone()),
            token_identifier_prefix: None,
        }
    }

    /// Set the event this token gives access to.
    pub fn event_id<S: Into<String>>(mut self, event_id: S) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Bind this token to a client IP address.
    pub fn ip_address<S: Into<String>>(mut self, ip_address: S) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Set the issue time for this token.
    ///
    /// Tokens carry millisecond precision so any sub-millisecond part is dropped.
    pub fn issued_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.issued = timestamp.trunc_subsecs(3);
        self
    }

    /// Set the expiration time for this token.
    pub fn expires_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.expires = Some(timestamp.trunc_subsecs(3));
        self
    }

    /// Set the expiration time for this token as an offset from its issue time.
    ///
    /// Offsets too large to be represented leave the token without an expiration time.
    pub fn expires_in(mut self, validity: Duration) -> Self {
        self.expires = i64::try_from(validity.as_millis())
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|validity| self.issued.checked_add_signed(validity));
        self
    }

    /// Attach a payload to this token.
    pub fn payload<P: Into<Arc<EnqueueTokenPayload>>>(mut self, payload: P) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Use a fixed token identifier instead of generating a new one every time.
    pub fn token_identifier<S: Into<String>>(mut self, token_identifier: S) -> Self {
        self.token_identifier = Some(token_identifier.into());
        self
    }

    /// Prefix generated token identifiers, which then look like `prefix~<uuid>`.
    pub fn token_identifier_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.token_identifier_prefix = Some(prefix.into());
        self
    }

    /// Generate a signed token.
    ///
    /// Unless a fixed identifier was set, every call uses a freshly generated token identifier and
    /// therefore produces a different token.
    pub fn generate(&self, secret_key: &str) -> Result<EnqueueToken, TokenError> {
        if secret_key.is_empty() {
            return Err(MalformedToken::EmptySecretKey.into());
        }
        let token_identifier = self.next_token_identifier();
        let header = HeaderFields {
            version: TokenVersion::Qt1,
            encryption: EncryptionType::Aes256,
            issued: self.issued,
            expires: self.expires,
            token_identifier,
            customer_id: self.customer_id.clone(),
            event_id: self.event_id.clone(),
            ip_address: self.ip_address.clone(),
        };

        let header_b64 = header.encode().map_err(TokenError::Serialization)?;
        let payload_b64 = match &self.payload {
            Some(payload) => {
                let cipher = PayloadCipher::new(secret_key, &header.token_identifier);
                payload.to_fields().encode(&cipher).map_err(TokenError::Serialization)?
            }
            None => String::new(),
        };
        let token = format!("{header_b64}.{payload_b64}");
        let signature = Sha256Signer::new(secret_key).sign(&token);
        debug!(
            token_identifier = header.token_identifier.as_str(),
            customer_id = header.customer_id.as_str(),
            has_payload = self.payload.is_some(),
            "generated queue token"
        );

        let HeaderFields { issued, expires, token_identifier, customer_id, event_id, ip_address, .. } = header;
        Ok(EnqueueToken {
            token_identifier,
            customer_id,
            event_id,
            ip_address,
            issued,
            expires,
            payload: self.payload.clone(),
            token,
            signature,
        })
    }

    fn next_token_identifier(&self) -> String {
        match (&self.token_identifier, &self.token_identifier_prefix) {
            (Some(token_identifier), _) => token_identifier.clone(),
            (None, Some(prefix)) => format!("{prefix}~{}", Uuid::new_v4()),
            (None, None) => Uuid::new_v4().to_string(),
        }
    }
}
