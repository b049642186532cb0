use crate::codec::PayloadFields;
use std::{collections::BTreeMap, sync::Arc};

/// The payload of an enqueue token.
///
/// This is encrypted when the token is generated and carries the data used to rank and group
/// the token once it reaches the queue.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnqueueTokenPayload {
    key: Option<String>,
    relative_quality: Option<f64>,
    custom_data: Arc<BTreeMap<String, String>>,
}

impl EnqueueTokenPayload {
    /// Start building a payload.
    pub fn builder() -> EnqueueTokenPayloadBuilder {
        EnqueueTokenPayloadBuilder::default()
    }

    /// The sorting/grouping key.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The relative quality used to order tokens within the queue.
    pub fn relative_quality(&self) -> Option<f64> {
        self.relative_quality
    }

    /// All custom data entries.
    pub fn custom_data(&self) -> &BTreeMap<String, String> {
        &self.custom_data
    }

    /// Look up a single custom data entry.
    pub fn custom_data_value(&self, key: &str) -> Option<&str> {
        self.custom_data.get(key).map(String::as_str)
    }

    pub(crate) fn to_fields(&self) -> PayloadFields {
        PayloadFields {
            relative_quality: self.relative_quality,
            key: self.key.clone(),
            custom_data: self.custom_data.as_ref().clone(),
        }
    }

    pub(crate) fn from_fields(fields: PayloadFields) -> Self {
        let PayloadFields { relative_quality, key, custom_data } = fields;
        Self { key, relative_quality, custom_data: Arc::new(custom_data) }
    }
}

/// A builder for an [`EnqueueTokenPayload`].
///
/// Cloning a builder is cheap: the custom data map is shared until one of the clones adds to it.
#[derive(Clone, Debug, Default)]
pub struct EnqueueTokenPayloadBuilder {
    payload: EnqueueTokenPayload,
}

impl EnqueueTokenPayloadBuilder {
    /// Set the sorting/grouping key.
    pub fn key<S: Into<String>>(mut self, key: S) -> Self {
        self.payload.key = Some(key.into());
        self
    }

    /// Set the relative quality.
    pub fn relative_quality(mut self, relative_quality: f64) -> Self {
        self.payload.relative_quality = Some(relative_quality);
        self
    }

    /// Add a custom data entry, replacing any previous value for the same key.
    pub fn custom_data<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Arc::make_mut(&mut self.payload.custom_data).insert(key.into(), value.into());
        self
    }

    /// Build the payload.
    pub fn build(self) -> EnqueueTokenPayload {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_only() {
        let payload = EnqueueTokenPayload::builder().key("myKey").build();
        assert_eq!(payload.key(), Some("myKey"));
        assert_eq!(payload.relative_quality(), None);
        assert!(payload.custom_data().is_empty());
        assert_eq!(payload.custom_data_value("key"), None);
    }

    #[test]
    fn key_and_relative_quality() {
        let payload = EnqueueTokenPayload::builder().key("myKey").relative_quality(0.456).build();
        assert_eq!(payload.key(), Some("myKey"));
        assert_eq!(payload.relative_quality(), Some(0.456));
        assert!(payload.custom_data().is_empty());
    }

    #[test]
    fn everything() {
        let payload =
            EnqueueTokenPayload::builder().key("myKey").relative_quality(0.456).custom_data("key", "Value").build();
        assert_eq!(payload.key(), Some("myKey"));
        assert_eq!(payload.relative_quality(), Some(0.456));
        assert_eq!(payload.custom_data_value("key"), Some("Value"));
    }

    #[test]
    fn custom_data_only() {
        let payload = EnqueueTokenPayload::builder().custom_data("key", "value").build();
        assert_eq!(payload.key(), None);
        assert_eq!(payload.relative_quality(), None);
        assert_eq!(payload.custom_data_value("key"), Some("value"));
    }

    #[test]
    fn duplicate_custom_data_key() {
        let payload = EnqueueTokenPayload::builder().custom_data("key", "first").custom_data("key", "second").build();
        assert_eq!(payload.custom_data().len(), 1);
        assert_eq!(payload.custom_data_value("key"), Some("second"));
    }

    #[test]
    fn earlier_builders_are_unaffected() {
        let base = EnqueueTokenPayload::builder().key("base").custom_data("color", "blue");
        let first = base.clone().custom_data("size", "medium").build();
        let second = base.clone().key("other").build();
        let base = base.build();

        assert_eq!(base.key(), Some("base"));
        assert_eq!(base.custom_data().len(), 1);
        assert_eq!(first.custom_data_value("size"), Some("medium"));
        assert_eq!(first.key(), Some("base"));
        assert_eq!(second.custom_data_value("size"), None);
        assert_eq!(second.key(), Some("other"));

        // Untouched custom data is shared rather than copied.
        assert!(Arc::ptr_eq(&base.custom_data, &second.custom_data));
        assert!(!Arc::ptr_eq(&base.custom_data, &first.custom_data));
    }

    #[test]
    fn fields_conversion() {
        let payload = EnqueueTokenPayload::builder().key("k").relative_quality(2.0).custom_data("a", "b").build();
        let fields = payload.to_fields();
        assert_eq!(fields.key.as_deref(), Some("k"));
        assert_eq!(fields.relative_quality, Some(2.0));
        assert_eq!(fields.custom_data.get("a").map(String::as_str), Some("b"));
        assert_eq!(EnqueueTokenPayload::from_fields(fields), payload);
    }
}
