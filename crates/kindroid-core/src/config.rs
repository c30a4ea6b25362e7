//! Client configuration model.
//!
//! The values here are opaque strings as far as the client is concerned. Where
//! they come from (secret.json, environment, CLI flags) is decided by the
//! infrastructure layer.

use serde::{Deserialize, Serialize};

/// Default Kindroid REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.kindroid.ai/v1";
/// Firestore project that stores chat history.
pub const DEFAULT_FIRESTORE_PROJECT: &str = "kindroid-ai";
/// Firestore database id.
pub const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";
/// Firestore REST v1 endpoint.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindroidConfig {
    /// API key or bearer token (JWT) issued by Kindroid
    #[serde(default)]
    pub api_key: String,
    /// Target AI (kindroid) identifier
    #[serde(default)]
    pub ai_id: String,
    /// User id used when neither the token nor the subscription endpoint yields one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Overrides [`DEFAULT_BASE_URL`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firestore: Option<FirestoreConfig>,
}

impl KindroidConfig {
    pub fn new(api_key: impl Into<String>, ai_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ai_id: ai_id.into(),
            ..Self::default()
        }
    }

    /// Returns the configured base URL or the default one, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    /// Returns the Firestore settings, falling back to defaults.
    pub fn firestore(&self) -> FirestoreConfig {
        self.firestore.clone().unwrap_or_default()
    }
}

/// Document store location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirestoreConfig {
    #[serde(default = "default_project_id")]
    pub project_id: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_firestore_url")]
    pub base_url: String,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            database: default_database(),
            base_url: default_firestore_url(),
        }
    }
}

fn default_project_id() -> String {
    DEFAULT_FIRESTORE_PROJECT.to_string()
}

fn default_database() -> String {
    DEFAULT_FIRESTORE_DATABASE.to_string()
}

fn default_firestore_url() -> String {
    DEFAULT_FIRESTORE_URL.to_string()
}
