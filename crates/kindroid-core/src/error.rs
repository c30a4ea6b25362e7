//! Error types for the Kindroid client.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for every Kindroid crate.
///
/// Each variant maps to one failure class of a single API call. None of them
/// are retried; the caller that triggered the call receives the error as-is.
#[derive(Error, Debug, Clone, Serialize)]
pub enum KindroidError {
    /// Network/transport failure before a response status was available
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status. The response body is not inspected.
    #[error("HTTP error: {status}")]
    Http { status: String },

    /// Malformed response payload or document
    #[error("Decode error: {format} - {message}")]
    Decode {
        format: String, // "JSON", "JWT", "Firestore", ...
        message: String,
    },

    /// Missing or insufficient user identity
    #[error("Identity error: {0}")]
    Identity(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Document store access error
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Ciphertext could not be decrypted
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },
}

impl KindroidError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Http error from a status line such as `404 Not Found`.
    pub fn http(status: impl Into<String>) -> Self {
        Self::Http {
            status: status.into(),
        }
    }

    /// Creates a Decode error
    pub fn decode(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates an Identity error
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Decryption error
    pub fn decryption(message: impl Into<String>) -> Self {
        Self::Decryption(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is an HTTP status error
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Check if this is a decode error
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Check if this is an identity/precondition error
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for KindroidError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for KindroidError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for KindroidError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode {
                format: "JSON".to_string(),
                message: err.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return Self::Http {
                status: status.to_string(),
            };
        }
        Self::Transport(err.to_string())
    }
}

/// A type alias for `Result<T, KindroidError>`.
pub type Result<T> = std::result::Result<T, KindroidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_carries_status_text() {
        let err = KindroidError::http("503 Service Unavailable");
        assert!(err.is_http());
        assert_eq!(err.to_string(), "HTTP error: 503 Service Unavailable");
    }

    #[test]
    fn test_json_error_becomes_decode() {
        let err: KindroidError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(err.is_decode());
        assert!(err.to_string().starts_with("Decode error: JSON"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: KindroidError = io.into();
        assert!(matches!(err, KindroidError::Io { ref message } if message.contains("NotFound")));
    }

    #[test]
    fn test_not_found_display() {
        let err = KindroidError::not_found("chat message", "msg-1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: chat message 'msg-1'");
    }
}
