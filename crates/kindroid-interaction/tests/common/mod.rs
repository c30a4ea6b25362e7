#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::http::HeaderMap;
use jsonwebtoken::{EncodingKey, Header, encode};
use kindroid_core::chat::{ChatMessage, ChatMessageStore};
use kindroid_interaction::Result;
use serde_json::{Value, json};

pub const AI_ID: &str = "test_ai_id";
pub const API_KEY: &str = "test_api_key";

/// Starts a stub server on an ephemeral port and returns its base URL.
///
/// `build` receives the base URL so handlers can hand out absolute links.
pub async fn spawn_stub<F>(build: F) -> String
where
    F: FnOnce(String) -> Router,
{
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let router = build(base.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base
}

/// Returns a base URL nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Mints an HS256 token; the client never checks the signature.
pub fn token_with(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"stub-signing-key"),
    )
    .unwrap()
}

pub fn token_for(user_id: &str) -> String {
    token_with(json!({ "user_id": user_id, "aud": "kindroid-ai" }))
}

/// A request as seen by a stub handler.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct RequestLog {
    seen: Mutex<Vec<SeenRequest>>,
}

impl RequestLog {
    pub fn record(&self, path: &str, headers: &HeaderMap, body: Value) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.seen.lock().unwrap().push(SeenRequest {
            path: path.to_string(),
            authorization: header("authorization"),
            content_type: header("content-type"),
            body,
        });
    }

    pub fn all(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn total(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

/// In-memory chat store that counts how often it is queried.
#[derive(Default)]
pub struct MemoryStore {
    pub messages: Vec<ChatMessage>,
    pub calls: AtomicUsize,
}

impl MemoryStore {
    pub fn with_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatMessageStore for MemoryStore {
    async fn get_message(
        &self,
        _user_id: &str,
        _ai_id: &str,
        message_id: &str,
    ) -> Result<Option<ChatMessage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.messages.iter().find(|m| m.id == message_id).cloned())
    }

    async fn list_recent(
        &self,
        _user_id: &str,
        _ai_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.messages.iter().take(limit).cloned().collect())
    }
}
