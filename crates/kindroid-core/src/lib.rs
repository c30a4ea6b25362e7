pub mod chat;
pub mod config;
pub mod error;
pub mod request;
pub mod subscription;

// Re-export common types
pub use chat::{ChatMessage, ChatMessageStore};
pub use config::KindroidConfig;
pub use error::{KindroidError, Result};
pub use request::{AudioInferenceRequest, ChatBreakRequest, SendMessageOptions, SendMessageReply};
pub use subscription::SubscriptionInfo;
