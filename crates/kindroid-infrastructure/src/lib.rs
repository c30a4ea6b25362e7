pub mod firestore;
pub mod paths;
pub mod storage;

pub use crate::firestore::FirestoreChatStore;
pub use crate::paths::KindroidPaths;
pub use crate::storage::{SecretStorage, load_config};
