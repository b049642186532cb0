use crate::encryption::DecryptError;

/// An error when generating or parsing a queue token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(#[from] MalformedToken),

    #[error("the token signature is invalid")]
    InvalidSignature,

    #[error("decrypting payload: {0}")]
    Decrypt(#[from] DecryptError),

    #[error("exception serializing token: {0}")]
    Serialization(#[source] CodecError),

    #[error("unable to deserialize token: {0}")]
    Deserialization(#[source] CodecError),
}

/// The reason a token was structurally invalid.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum MalformedToken {
    #[error("empty secret key")]
    EmptySecretKey,

    #[error("empty input")]
    NoInput,

    #[error("token is larger than max allowed: {0} bytes")]
    TooLarge(usize),

    #[error("expected 3 dot separated segments, found {0}")]
    SegmentCount(usize),

    #[error("empty header segment")]
    EmptyHeader,

    #[error("empty signature segment")]
    EmptySignature,
}

/// An error while encoding or decoding the header or payload of a token.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid base64 found on {0}: {1}")]
    Base64(&'static str, base64::DecodeError),

    #[error("invalid JSON on {0}: {1}")]
    Json(&'static str, serde_json::Error),

    #[error("decrypting payload: {0}")]
    Decrypt(#[from] DecryptError),

    #[error("relative quality must be finite: {0}")]
    RelativeQuality(f64),
}
