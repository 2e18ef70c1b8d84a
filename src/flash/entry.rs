use std::collections::BTreeMap;

use crate::value::Value;

/// MIME type applied when an entry does not carry one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// A single flash message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashEntry {
    /// Short category, e.g. `"error"`, `"notice"`, `"success"`. May be empty.
    pub kind: String,
    /// The message payload.
    pub message: String,
    /// MIME type of the payload, e.g. `"text/plain"` or `"text/html"`.
    pub content_type: String,
}

impl FlashEntry {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_content_type(
        kind: impl Into<String>,
        message: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            content_type: content_type.into(),
        }
    }

    /// The record shape stored under the reserved key:
    /// `{type, message, contentType}`.
    pub(crate) fn to_value(&self) -> Value {
        let mut record = BTreeMap::new();
        record.insert("type".to_string(), Value::Str(self.kind.clone()));
        record.insert("message".to_string(), Value::Str(self.message.clone()));
        record.insert(
            "contentType".to_string(),
            Value::Str(self.content_type.clone()),
        );
        Value::Map(record)
    }

    /// Parse a stored record. `message` is required; `type` defaults to the
    /// empty string and `contentType` to `"text/plain"`.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_map()?;
        let message = record.get("message")?.as_str()?;

        let kind = record
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let content_type = record
            .get("contentType")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        Some(Self {
            kind: kind.to_string(),
            message: message.to_string(),
            content_type: content_type.to_string(),
        })
    }
}
