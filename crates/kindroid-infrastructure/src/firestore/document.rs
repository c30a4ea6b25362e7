//! Decoding of Firestore REST documents into chat messages.
//!
//! Firestore wraps every field in a typed value object, e.g.
//! `{"stringValue": "hi"}` or `{"timestampValue": "2024-05-01T10:00:00Z"}`.

use chrono::{DateTime, Utc};
use kindroid_core::chat::ChatMessage;
use kindroid_core::{KindroidError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const FIELD_SENDER: &str = "sender";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_TIMESTAMP: &str = "timestamp";
pub const FIELD_AUDIO_URL: &str = "audioUrl";

/// A document as returned by the Firestore REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// Full resource name, ending in the document id
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// One element of a `:runQuery` response stream.
#[derive(Debug, Deserialize)]
pub struct RunQueryResponse {
    #[serde(default)]
    pub document: Option<Document>,
}

impl Document {
    /// Returns the last segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn string_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field)?.get("stringValue")?.as_str()
    }

    fn timestamp_field(&self, field: &str) -> Result<Option<DateTime<Utc>>> {
        let Some(value) = self.fields.get(field) else {
            return Ok(None);
        };

        if let Some(raw) = value.get("timestampValue").and_then(Value::as_str) {
            let parsed = DateTime::parse_from_rfc3339(raw).map_err(|e| {
                KindroidError::decode("Firestore", format!("bad timestamp '{}': {}", raw, e))
            })?;
            return Ok(Some(parsed.with_timezone(&Utc)));
        }

        // Epoch milliseconds stored as a number
        let millis = if let Some(raw) = value.get("integerValue").and_then(Value::as_str) {
            raw.parse::<i64>().ok()
        } else {
            value
                .get("doubleValue")
                .and_then(Value::as_f64)
                .map(|ms| ms as i64)
        };

        match millis {
            Some(ms) => Ok(DateTime::from_timestamp_millis(ms)),
            None if value.get("nullValue").is_some() => Ok(None),
            None => Err(KindroidError::decode(
                "Firestore",
                format!("field '{}' is not a timestamp", field),
            )),
        }
    }

    /// Converts the document into a [`ChatMessage`] without decrypting anything.
    pub fn to_chat_message(&self) -> Result<ChatMessage> {
        let sender = self.string_field(FIELD_SENDER).ok_or_else(|| {
            KindroidError::decode("Firestore", format!("document {} has no sender", self.id()))
        })?;
        let message = self.string_field(FIELD_MESSAGE).ok_or_else(|| {
            KindroidError::decode("Firestore", format!("document {} has no message", self.id()))
        })?;

        Ok(ChatMessage {
            id: self.id().to_string(),
            sender: sender.to_string(),
            timestamp: self.timestamp_field(FIELD_TIMESTAMP)?,
            message: message.to_string(),
            audio_url: self
                .string_field(FIELD_AUDIO_URL)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        })
    }
}
