pub mod model;
pub mod store;

pub use model::{ChatMessage, SENDER_AI, SENDER_USER};
pub use store::{ChatMessageStore, chat_messages_path};
