use thiserror::Error;

use crate::services::encryption::EncryptionError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),
}

pub type Result<T> = std::result::Result<T, AppError>;
