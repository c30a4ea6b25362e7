pub mod secret_storage;

pub use secret_storage::{SecretStorage, SecretStorageError, load_config, resolve_config};
