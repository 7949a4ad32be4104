//! Secure key-value stores holding the serialized card blob.

use async_trait::async_trait;

use crate::services::encryption::EncryptionError;

pub mod file;
pub mod memory;

pub use file::EncryptedFileStore;
pub use memory::MemoryStore;

/// Store key the card collection lives under unless configured otherwise
pub const DEFAULT_ITEM_KEY: &str = "data";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value could not be opened: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Platform-style encrypted key-value storage.
///
/// Values are opaque strings; every write replaces the previous value.
#[async_trait]
pub trait SecureStore: Send + Sync {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Returns `None` when nothing has been stored under `key`.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
}
