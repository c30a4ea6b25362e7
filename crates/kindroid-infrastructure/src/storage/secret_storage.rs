//! Secret configuration file storage.
//!
//! Loads the client configuration from ~/.config/kindroid/secret.json, with
//! environment variables filling whatever the file leaves out.

use crate::paths::KindroidPaths;
use kindroid_core::KindroidError;
use kindroid_core::config::KindroidConfig;
use std::fs;
use std::path::PathBuf;

pub const ENV_API_KEY: &str = "KINDROID_API_KEY";
pub const ENV_AI_ID: &str = "KINDROID_AI_ID";
pub const ENV_USER_ID: &str = "KINDROID_USER_ID";
pub const ENV_BASE_URL: &str = "KINDROID_BASE_URL";

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Configuration file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine home directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

impl From<SecretStorageError> for KindroidError {
    fn from(e: SecretStorageError) -> Self {
        KindroidError::config(e.to_string())
    }
}

/// Storage for the secret configuration file (secret.json).
///
/// Read-only. Credentials are not validated here; a malformed token simply
/// fails identity resolution later.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a SecretStorage with the default path (~/.config/kindroid/secret.json).
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = KindroidPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a SecretStorage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the configuration from the JSON file.
    ///
    /// # Returns
    ///
    /// - `Ok(KindroidConfig)`: Successfully loaded and parsed
    /// - `Err(SecretStorageError::NotFound)`: File doesn't exist
    /// - `Err(SecretStorageError::IoError)`: Failed to read file
    /// - `Err(SecretStorageError::ParseError)`: Invalid JSON format
    pub fn load(&self) -> Result<KindroidConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Loads the client configuration.
///
/// Priority:
/// 1. ~/.config/kindroid/secret.json
/// 2. Environment variables (KINDROID_API_KEY, KINDROID_AI_ID, KINDROID_USER_ID, KINDROID_BASE_URL)
pub fn load_config() -> Result<KindroidConfig, KindroidError> {
    let from_file = match SecretStorage::new().and_then(|storage| storage.load()) {
        Ok(config) => Some(config),
        Err(SecretStorageError::NotFound(path)) => {
            tracing::debug!("No secret file at {}, using environment", path.display());
            None
        }
        Err(SecretStorageError::ConfigDirNotFound) => None,
        Err(e) => return Err(e.into()),
    };

    resolve_config(from_file, |key| std::env::var(key).ok())
}

/// Merges a file configuration with environment lookups and validates the result.
///
/// File values win; the environment only fills empty or missing fields.
pub fn resolve_config<F>(
    from_file: Option<KindroidConfig>,
    env: F,
) -> Result<KindroidConfig, KindroidError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = from_file.unwrap_or_default();
    let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    if config.api_key.is_empty() {
        config.api_key = env(ENV_API_KEY).unwrap_or_default();
    }
    if config.ai_id.is_empty() {
        config.ai_id = env(ENV_AI_ID).unwrap_or_default();
    }
    if config.user_id.is_none() {
        config.user_id = env(ENV_USER_ID);
    }
    if config.base_url.is_none() {
        config.base_url = env(ENV_BASE_URL);
    }

    if config.api_key.is_empty() {
        return Err(KindroidError::config(format!(
            "{} not found in secret.json or environment variables",
            ENV_API_KEY
        )));
    }
    if config.ai_id.is_empty() {
        return Err(KindroidError::config(format!(
            "{} not found in secret.json or environment variables",
            ENV_AI_ID
        )));
    }

    Ok(config)
}
