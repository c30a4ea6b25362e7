//! Client for the Kindroid AI REST API.
//!
//! [`KindroidClient`] covers messaging, chat breaks, subscription lookup and
//! audio inference. Sessions whose API key is a JWT can also read the
//! encrypted chat history, which [`codec`] decrypts on the way out.

pub mod client;
pub mod codec;
pub mod identity;

pub use client::KindroidClient;
pub use identity::{AuthMode, ResolvedIdentity};
pub use kindroid_core::{
    ChatMessage, KindroidConfig, KindroidError, Result, SendMessageOptions, SendMessageReply,
    SubscriptionInfo,
};
