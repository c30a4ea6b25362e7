//! Firestore-backed chat message store.
//!
//! Talks to the Firestore REST v1 API directly, authenticating with the
//! Kindroid bearer credential as a static token.

pub mod document;

use async_trait::async_trait;
use kindroid_core::chat::store::{CHAT_MESSAGES_COLLECTION, ai_document_path};
use kindroid_core::chat::{ChatMessage, ChatMessageStore, chat_messages_path};
use kindroid_core::config::FirestoreConfig;
use kindroid_core::{KindroidError, Result};
use reqwest::{Client, StatusCode};
use serde_json::json;

use self::document::{Document, FIELD_TIMESTAMP, RunQueryResponse};

#[derive(Clone)]
pub struct FirestoreChatStore {
    client: Client,
    token: String,
    config: FirestoreConfig,
}

impl FirestoreChatStore {
    pub fn new(token: impl Into<String>, config: FirestoreConfig) -> Self {
        Self::with_client(Client::new(), token, config)
    }

    /// Shares an existing HTTP client (connection pool) with the store.
    pub fn with_client(client: Client, token: impl Into<String>, config: FirestoreConfig) -> Self {
        Self {
            client,
            token: token.into(),
            config,
        }
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id,
            self.config.database
        )
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[async_trait]
impl ChatMessageStore for FirestoreChatStore {
    async fn get_message(
        &self,
        user_id: &str,
        ai_id: &str,
        message_id: &str,
    ) -> Result<Option<ChatMessage>> {
        let url = format!(
            "{}/{}/{}",
            self.documents_root(),
            chat_messages_path(user_id, ai_id),
            message_id
        );
        tracing::debug!("Firestore lookup of chat message {}", message_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(KindroidError::data_access(format!(
                "failed to retrieve document {}: {}",
                message_id, status
            )));
        }

        let document: Document = response.json().await?;
        document.to_chat_message().map(Some)
    }

    async fn list_recent(
        &self,
        user_id: &str,
        ai_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>> {
        let url = format!(
            "{}/{}:runQuery",
            self.documents_root(),
            ai_document_path(user_id, ai_id)
        );
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": CHAT_MESSAGES_COLLECTION }],
                "orderBy": [{
                    "field": { "fieldPath": FIELD_TIMESTAMP },
                    "direction": "DESCENDING"
                }],
                "limit": limit
            }
        });
        tracing::debug!("Firestore query for {} recent chat messages", limit);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KindroidError::data_access(format!(
                "failed to retrieve documents: {}",
                status
            )));
        }

        let entries: Vec<RunQueryResponse> = response.json().await?;
        let messages = entries
            .into_iter()
            .filter_map(|entry| entry.document)
            .filter_map(|doc| match doc.to_chat_message() {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!("Failed to parse chat message document {}: {}", doc.id(), e);
                    None
                }
            })
            .collect();

        Ok(messages)
    }
}
