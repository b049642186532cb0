use crate::{
    encoding,
    encryption::PayloadCipher,
    error::CodecError,
    token::{EncryptionType, TokenVersion},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

// Doubles beyond this can't be represented exactly as integers.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// The fields in a token header.
///
/// Fields are serialized in declaration order and optional ones are omitted when absent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct HeaderFields {
    #[serde(rename = "typ")]
    pub(crate) version: TokenVersion,

    #[serde(rename = "enc")]
    pub(crate) encryption: EncryptionType,

    #[serde(rename = "iss", with = "chrono::serde::ts_milliseconds")]
    pub(crate) issued: DateTime<Utc>,

    #[serde(
        rename = "exp",
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) expires: Option<DateTime<Utc>>,

    #[serde(rename = "ti")]
    pub(crate) token_identifier: String,

    #[serde(rename = "c")]
    pub(crate) customer_id: String,

    #[serde(rename = "e", default, skip_serializing_if = "Option::is_none")]
    pub(crate) event_id: Option<String>,

    #[serde(rename = "ip", default, skip_serializing_if = "Option::is_none")]
    pub(crate) ip_address: Option<String>,
}

impl HeaderFields {
    /// Encode this header as base64url JSON.
    pub(crate) fn encode(&self) -> Result<String, CodecError> {
        encoding::encode_json(self).map_err(|e| CodecError::Json("header", e))
    }

    /// Decode a base64url JSON header segment.
    pub(crate) fn decode(segment: &str) -> Result<Self, CodecError> {
        let json = encoding::decode(segment).map_err(|e| CodecError::Base64("header", e))?;
        serde_json::from_slice(&json).map_err(|e| CodecError::Json("header", e))
    }
}

/// The fields in a token payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub(crate) struct PayloadFields {
    #[serde(
        rename = "r",
        default,
        serialize_with = "serialize_relative_quality",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) relative_quality: Option<f64>,

    #[serde(rename = "k", default, skip_serializing_if = "Option::is_none")]
    pub(crate) key: Option<String>,

    #[serde(
        rename = "cd",
        default,
        deserialize_with = "deserialize_custom_data",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub(crate) custom_data: BTreeMap<String, String>,
}

impl PayloadFields {
    /// Serialize this payload as JSON.
    pub(crate) fn to_json(&self) -> Result<Vec<u8>, CodecError> {
        if let Some(relative_quality) = self.relative_quality.filter(|value| !value.is_finite()) {
            return Err(CodecError::RelativeQuality(relative_quality));
        }
        serde_json::to_vec(self).map_err(|e| CodecError::Json("payload", e))
    }

    /// Serialize, encrypt and base64url encode this payload.
    pub(crate) fn encode(&self, cipher: &PayloadCipher) -> Result<String, CodecError> {
        let json = self.to_json()?;
        Ok(encoding::encode(cipher.encrypt(&json)))
    }

    /// Decode, decrypt and deserialize a payload segment.
    pub(crate) fn decode(segment: &str, cipher: &PayloadCipher) -> Result<Self, CodecError> {
        let encrypted = encoding::decode(segment).map_err(|e| CodecError::Base64("payload", e))?;
        let json = cipher.decrypt(&encrypted)?;
        serde_json::from_slice(&json).map_err(|e| CodecError::Json("payload", e))
    }
}

// Integral values are written without a fractional part, e.g. `1` rather than `1.0`.
fn serialize_relative_quality<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match *value {
        Some(value) if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER => {
            serializer.serialize_i64(value as i64)
        }
        Some(value) => serializer.serialize_f64(value),
        None => serializer.serialize_none(),
    }
}

fn deserialize_custom_data<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error> {
    let custom_data = Option::<BTreeMap<String, String>>::deserialize(deserializer)?;
    Ok(custom_data.unwrap_or_default())
}
