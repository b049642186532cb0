use crate::{
    codec::{HeaderFields, PayloadFields},
    encryption::PayloadCipher,
    error::{MalformedToken, TokenError},
    payload::EnqueueTokenPayload,
    signer::{Sha256Signer, Signer},
    token::EnqueueToken,
};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_MAX_RAW_TOKEN_SIZE: usize = 1024 * 10;

/// An enqueue token decoder.
#[derive(Debug)]
pub struct EnqueueTokenDecoder {
    /// The maximum raw token size, in bytes.
    pub max_raw_token_size: usize,
}

impl Default for EnqueueTokenDecoder {
    fn default() -> Self {
        Self { max_raw_token_size: DEFAULT_MAX_RAW_TOKEN_SIZE }
    }
}

impl EnqueueTokenDecoder {
    /// Decode a signed token and verify it was signed using the given secret key.
    ///
    /// The signature is checked before anything else is decoded, so a tampered token never gets
    /// its payload decrypted.
    pub fn decode(&self, input: &str, secret_key: &str) -> Result<EnqueueToken, TokenError> {
        match self.try_decode(input, secret_key) {
            Ok(token) => {
                debug!(token_identifier = token.token_identifier(), "parsed queue token");
                Ok(token)
            }
            Err(e) => {
                debug!("rejected queue token: {e}");
                Err(e)
            }
        }
    }

    fn try_decode(&self, input: &str, secret_key: &str) -> Result<EnqueueToken, TokenError> {
        if secret_key.is_empty() {
            return Err(MalformedToken::EmptySecretKey.into());
        }
        if input.len() > self.max_raw_token_size {
            return Err(MalformedToken::TooLarge(self.max_raw_token_size).into());
        }
        let raw = RawEnqueueToken::split(input)?;
        raw.verify_signature(&Sha256Signer::new(secret_key))?;

        let header = HeaderFields::decode(raw.header).map_err(TokenError::Deserialization)?;
        let payload = if raw.payload.is_empty() {
            None
        } else {
            let cipher = PayloadCipher::new(secret_key, &header.token_identifier);
            let fields = PayloadFields::decode(raw.payload, &cipher).map_err(TokenError::Deserialization)?;
            Some(Arc::new(EnqueueTokenPayload::from_fields(fields)))
        };

        let HeaderFields { issued, expires, token_identifier, customer_id, event_id, ip_address, .. } = header;
        Ok(EnqueueToken {
            token_identifier,
            customer_id,
            event_id,
            ip_address,
            issued,
            expires,
            payload,
            token: raw.body.to_string(),
            signature: raw.signature.to_string(),
        })
    }
}

/// A token split into its segments, none of which have been decoded yet.
#[derive(Clone, Copy, Debug)]
struct RawEnqueueToken<'a> {
    body: &'a str,
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> RawEnqueueToken<'a> {
    fn split(input: &'a str) -> Result<Self, MalformedToken> {
        if input.is_empty() {
            return Err(MalformedToken::NoInput);
        }
        let segments: Vec<&str> = input.split('.').collect();
        let &[header, payload, signature] = segments.as_slice() else {
            return Err(MalformedToken::SegmentCount(segments.len()));
        };
        if header.is_empty() {
            return Err(MalformedToken::EmptyHeader);
        }
        if signature.is_empty() {
            return Err(MalformedToken::EmptySignature);
        }
        // The body is everything up to the last dot.
        let body = &input[..input.len() - signature.len() - 1];
        Ok(Self { body, header, payload, signature })
    }

    fn verify_signature(&self, signer: &impl Signer) -> Result<(), TokenError> {
        if signer.verify(self.body, self.signature) {
            Ok(())
        } else {
            Err(TokenError::InvalidSignature)
        }
    }
}
