use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sender tag the service uses for AI-authored messages.
pub const SENDER_AI: &str = "ai";
/// Sender tag for messages written by the user.
pub const SENDER_USER: &str = "user";

/// A single stored chat message.
///
/// `message` and `audio_url` may hold `!enc:`-prefixed ciphertext when they
/// come straight from the document store. The client decrypts both in place
/// before returning records to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Document id within the `ChatMessages` collection
    pub id: String,
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl ChatMessage {
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            timestamp: None,
            message: message.into(),
            audio_url: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_audio_url(mut self, audio_url: impl Into<String>) -> Self {
        self.audio_url = Some(audio_url.into());
        self
    }

    pub fn is_from_ai(&self) -> bool {
        self.sender == SENDER_AI
    }

    /// Returns true when an audio rendition has already been generated.
    pub fn has_audio(&self) -> bool {
        self.audio_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_from_ai() {
        assert!(ChatMessage::new("1", SENDER_AI, "hi").is_from_ai());
        assert!(!ChatMessage::new("2", SENDER_USER, "hi").is_from_ai());
    }

    #[test]
    fn test_empty_audio_url_is_not_audio() {
        let msg = ChatMessage::new("1", SENDER_AI, "hi");
        assert!(!msg.has_audio());
        assert!(!msg.clone().with_audio_url("").has_audio());
        assert!(msg.with_audio_url("https://cdn.example/a.mp3").has_audio());
    }
}
