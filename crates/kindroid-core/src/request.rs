//! Request and reply bodies of the Kindroid REST endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /send-message`.
///
/// Every optional field is omitted from the JSON when unset; the endpoint
/// does not accept `null` for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageOptions {
    pub ai_id: String,
    pub message: String,
    /// Forwarded to the service only. The reply is still read in one piece.
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internet_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_description: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SendMessageOptions {
    pub fn new(ai_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ai_id: ai_id.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Attaches an image by URL. May be called more than once.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_urls.push(url.into());
        self
    }

    pub fn with_image_description(mut self, description: impl Into<String>) -> Self {
        self.image_description = Some(description.into());
        self
    }

    pub fn with_video(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.video_url = Some(url.into());
        self.video_description = description;
        self
    }

    pub fn with_link(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.link_url = Some(url.into());
        self.link_description = description;
        self
    }

    pub fn with_internet_response(mut self, response: impl Into<String>) -> Self {
        self.internet_response = Some(response.into());
        self
    }
}

/// Body of `POST /chat-break`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBreakRequest {
    pub ai_id: String,
    pub greeting: String,
}

/// Body of `POST /audio-inference`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInferenceRequest {
    pub ai_id: String,
    #[serde(rename = "messageID")]
    pub message_id: String,
}

/// Parsed reply of an advanced send.
#[derive(Debug, Clone, PartialEq)]
pub enum SendMessageReply {
    /// A JSON string literal or a plain-text body
    Text(String),
    /// Any other JSON document
    Structured(serde_json::Value),
}

impl SendMessageReply {
    /// Interprets a raw response body.
    ///
    /// A body that is not JSON at all is taken as plain text, which is what
    /// the service returns for non-streamed replies.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::String(text)) => Self::Text(text),
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Text(body.to_string()),
        }
    }

    /// Returns the reply text, if the reply carries any.
    ///
    /// Structured replies are searched for a top-level `reply`, `message`
    /// or `text` string.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(value) => ["reply", "message", "text"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str())),
        }
    }
}
