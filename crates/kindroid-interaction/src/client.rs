//! KindroidClient - REST session for the Kindroid API.
//!
//! Every operation is a single request (or a short fixed sequence of them)
//! awaited to completion. Nothing is retried; the first error is returned.

use std::sync::Arc;

use kindroid_core::chat::{ChatMessage, ChatMessageStore};
use kindroid_core::config::{FirestoreConfig, KindroidConfig};
use kindroid_core::{
    AudioInferenceRequest, ChatBreakRequest, KindroidError, Result, SendMessageOptions,
    SendMessageReply, SubscriptionInfo,
};
use kindroid_infrastructure::FirestoreChatStore;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;

use crate::codec::{self, DECRYPTION_FAILED_PLACEHOLDER};
use crate::identity::{self, ResolvedIdentity};

/// A session with the Kindroid API for one AI.
///
/// Construct once, call [`KindroidClient::setup_user_and_permissions`] before
/// sharing it, then use it read-only.
#[derive(Clone)]
pub struct KindroidClient {
    client: Client,
    api_key: String,
    ai_id: String,
    base_url: String,
    fallback_user_id: Option<String>,
    identity: Option<ResolvedIdentity>,
    store: Arc<dyn ChatMessageStore>,
}

impl std::fmt::Debug for KindroidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindroidClient")
            .field("ai_id", &self.ai_id)
            .field("base_url", &self.base_url)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl KindroidClient {
    /// Creates a client against the public endpoint and chat store.
    pub fn new(api_key: impl Into<String>, ai_id: impl Into<String>) -> Self {
        Self::from_config(&KindroidConfig::new(api_key, ai_id))
    }

    pub fn from_config(config: &KindroidConfig) -> Self {
        let client = Client::new();
        let store = FirestoreChatStore::with_client(
            client.clone(),
            config.api_key.clone(),
            config.firestore(),
        );

        Self {
            client,
            api_key: config.api_key.clone(),
            ai_id: config.ai_id.clone(),
            base_url: config.base_url().to_string(),
            fallback_user_id: config.user_id.clone().filter(|id| !id.is_empty()),
            identity: None,
            store: Arc::new(store),
        }
    }

    /// Loads configuration from ~/.config/kindroid/secret.json or environment variables.
    ///
    /// Priority:
    /// 1. ~/.config/kindroid/secret.json
    /// 2. Environment variables (KINDROID_API_KEY, KINDROID_AI_ID, KINDROID_USER_ID,
    ///    KINDROID_BASE_URL)
    pub fn try_from_env() -> Result<Self> {
        let config = kindroid_infrastructure::load_config()?;
        Ok(Self::from_config(&config))
    }

    /// Overrides the API base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Points the chat store at another Firestore location.
    pub fn with_firestore(mut self, config: FirestoreConfig) -> Self {
        self.store = Arc::new(FirestoreChatStore::with_client(
            self.client.clone(),
            self.api_key.clone(),
            config,
        ));
        self
    }

    /// Replaces the chat message store.
    pub fn with_store(mut self, store: Arc<dyn ChatMessageStore>) -> Self {
        self.store = store;
        self
    }

    /// Sets the user id used when neither the token nor the subscription lookup yields one.
    pub fn with_fallback_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.fallback_user_id = Some(user_id.into());
        self
    }

    pub fn ai_id(&self) -> &str {
        &self.ai_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn identity(&self) -> Option<&ResolvedIdentity> {
        self.identity.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.user_id.as_str())
    }

    pub fn is_token_authenticated(&self) -> bool {
        self.identity
            .as_ref()
            .is_some_and(ResolvedIdentity::is_token_authenticated)
    }

    // ============================================================================
    // Identity
    // ============================================================================

    /// Resolves the user id for this session.
    ///
    /// Tries the JWT `user_id` claim first. Otherwise falls back to the
    /// subscription endpoint, then to the configured fallback id; both of
    /// those leave the session without token authentication.
    ///
    /// The identity is resolved once; later calls return it unchanged.
    pub async fn setup_user_and_permissions(&mut self) -> Result<&ResolvedIdentity> {
        if self.identity.is_some() {
            tracing::debug!("User id already resolved, keeping it");
            return self
                .identity
                .as_ref()
                .ok_or_else(|| KindroidError::identity("identity unexpectedly missing"));
        }

        let resolved = match identity::user_id_from_token(&self.api_key) {
            Ok(user_id) => {
                tracing::info!("Resolved user id from API key token");
                ResolvedIdentity::from_token(user_id)
            }
            Err(token_err) => {
                tracing::info!(
                    "Could not extract user id from API key ({}), checking subscription",
                    token_err
                );
                match self.check_user_subscription().await {
                    Ok(info) if !info.uid.is_empty() => {
                        ResolvedIdentity::from_subscription(info.uid)
                    }
                    Ok(_) => self.fallback_identity(
                        token_err,
                        KindroidError::identity("subscription response has an empty uid"),
                    )?,
                    Err(sub_err) => self.fallback_identity(token_err, sub_err)?,
                }
            }
        };

        let identity: &ResolvedIdentity = self.identity.insert(resolved);
        Ok(identity)
    }

    fn fallback_identity(
        &self,
        token_err: KindroidError,
        sub_err: KindroidError,
    ) -> Result<ResolvedIdentity> {
        match &self.fallback_user_id {
            Some(user_id) => {
                tracing::warn!(
                    "Subscription lookup failed ({}), using configured user id",
                    sub_err
                );
                Ok(ResolvedIdentity::from_subscription(user_id.clone()))
            }
            None => Err(KindroidError::identity(format!(
                "unable to resolve user id: token: {}; subscription: {}",
                token_err, sub_err
            ))),
        }
    }

    fn require_token_identity(&self, operation: &str) -> Result<&ResolvedIdentity> {
        match &self.identity {
            Some(identity) if identity.is_token_authenticated() => Ok(identity),
            Some(_) => Err(KindroidError::identity(format!(
                "{} requires a JWT API key; the user id was not obtained from the token",
                operation
            ))),
            None => Err(KindroidError::identity(format!(
                "{} requires a resolved user id; call setup_user_and_permissions first",
                operation
            ))),
        }
    }

    // ============================================================================
    // HTTP request layer
    // ============================================================================

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        ensure_ok(response)
    }

    async fn send_message_raw(&self, options: &SendMessageOptions) -> Result<String> {
        let response = self.post_json("send-message", options).await?;
        Ok(response.text().await?)
    }

    /// Sends a message to the AI and returns the raw response body.
    pub async fn send_message(&self, message: &str) -> Result<String> {
        let options = SendMessageOptions::new(self.ai_id.clone(), message);
        self.send_message_raw(&options).await
    }

    /// Sends a message with multimedia/context options.
    pub async fn send_message_advanced(
        &self,
        options: &SendMessageOptions,
    ) -> Result<SendMessageReply> {
        let body = self.send_message_raw(options).await?;
        Ok(SendMessageReply::from_body(&body))
    }

    /// Ends the current chat and starts a new one opened by `greeting`.
    pub async fn chat_break(&self, greeting: &str) -> Result<()> {
        let request = ChatBreakRequest {
            ai_id: self.ai_id.clone(),
            greeting: greeting.to_string(),
        };
        self.post_json("chat-break", &request).await?;
        Ok(())
    }

    /// Retrieves the user's subscription details.
    ///
    /// The endpoint is undocumented and may change without notice.
    pub async fn check_user_subscription(&self) -> Result<SubscriptionInfo> {
        let response = self
            .post_json("check-user-subscription", &serde_json::json!({}))
            .await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            KindroidError::decode("JSON", format!("failed to unmarshal subscription info: {}", e))
        })
    }

    /// Asks the service to render audio for a message. Undocumented endpoint.
    pub async fn request_audio_inference(&self, message_id: &str) -> Result<()> {
        let request = AudioInferenceRequest {
            ai_id: self.ai_id.clone(),
            message_id: message_id.to_string(),
        };
        self.post_json("audio-inference", &request).await?;
        Ok(())
    }

    /// Downloads an audio resource. The URL is already signed; no credential is sent.
    pub async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET audio resource");
        let response = ensure_ok(self.client.get(url).send().await?)?;
        Ok(response.bytes().await?.to_vec())
    }

    // ============================================================================
    // Chat history (token-authenticated sessions only)
    // ============================================================================

    /// Retrieves the most recent messages for `ai_id`, newest first, decrypted.
    pub async fn get_chat_history(&self, ai_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
        let identity = self.require_token_identity("chat history")?;

        let mut messages = self
            .store
            .list_recent(&identity.user_id, ai_id, limit)
            .await?;
        for message in &mut messages {
            codec::decrypt_message(message, &identity.user_id);
        }
        Ok(messages)
    }

    /// Looks up a single message by id, decrypted.
    pub async fn get_chat_message(
        &self,
        ai_id: &str,
        message_id: &str,
    ) -> Result<Option<ChatMessage>> {
        let identity = self.require_token_identity("chat message lookup")?;

        let message = self
            .store
            .get_message(&identity.user_id, ai_id, message_id)
            .await?;
        Ok(message.map(|mut message| {
            codec::decrypt_message(&mut message, &identity.user_id);
            message
        }))
    }

    /// Returns the audio of an AI message, generating it first when missing.
    ///
    /// At most one inference request and one re-lookup are made.
    pub async fn audio_inference(&self, message_id: &str) -> Result<Vec<u8>> {
        self.require_token_identity("audio inference")?;

        let mut message = self
            .get_chat_message(&self.ai_id, message_id)
            .await?
            .ok_or_else(|| KindroidError::not_found("chat message", message_id))?;

        if !message.has_audio() {
            tracing::info!("No audio for message {}, requesting inference", message_id);
            self.request_audio_inference(message_id).await?;
            message = self
                .get_chat_message(&self.ai_id, message_id)
                .await?
                .ok_or_else(|| KindroidError::not_found("chat message", message_id))?;
        }

        let audio_url = match message.audio_url.as_deref() {
            Some(url) if url == DECRYPTION_FAILED_PLACEHOLDER => {
                return Err(KindroidError::decryption(format!(
                    "audio reference of message {} could not be decrypted",
                    message_id
                )));
            }
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                return Err(KindroidError::not_found("audio for chat message", message_id));
            }
        };

        self.fetch_audio(&audio_url).await
    }
}

/// Maps any status other than 200 to [`KindroidError::Http`], dropping the body.
fn ensure_ok(response: Response) -> Result<Response> {
    let status = response.status();
    if status != StatusCode::OK {
        return Err(KindroidError::http(status.to_string()));
    }
    Ok(response)
}
