//! Chat message store trait.
//!
//! Defines the interface for reading stored chat messages. Records are
//! returned exactly as stored; decryption is the caller's job.

use super::model::ChatMessage;
use crate::error::Result;

/// Name of the collection holding chat messages.
pub const CHAT_MESSAGES_COLLECTION: &str = "ChatMessages";

/// Returns the parent document path of a user's chat with one AI.
pub fn ai_document_path(user_id: &str, ai_id: &str) -> String {
    format!("Users/{}/AIs/{}", user_id, ai_id)
}

/// Returns the collection path `Users/{userID}/AIs/{aiID}/ChatMessages`.
pub fn chat_messages_path(user_id: &str, ai_id: &str) -> String {
    format!("{}/{}", ai_document_path(user_id, ai_id), CHAT_MESSAGES_COLLECTION)
}

/// Read access to the document store holding chat history.
///
/// Implementations authenticate with the same bearer credential as the
/// Kindroid API.
#[async_trait::async_trait]
pub trait ChatMessageStore: Send + Sync {
    /// Looks up a single message by document id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ChatMessage))`: The document exists
    /// - `Ok(None)`: No document with that id
    /// - `Err(KindroidError)`: The store could not be queried
    async fn get_message(
        &self,
        user_id: &str,
        ai_id: &str,
        message_id: &str,
    ) -> Result<Option<ChatMessage>>;

    /// Lists the most recent messages, newest first, at most `limit` rows.
    async fn list_recent(&self, user_id: &str, ai_id: &str, limit: usize)
    -> Result<Vec<ChatMessage>>;
}
