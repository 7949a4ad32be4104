use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{SecureStore, StoreError};
use crate::services::encryption::BlobCipher;

const BLOB_EXTENSION: &str = "blob";

/// Encrypted store backed by one file per item key.
///
/// File names are the hex-encoded item key so any key string maps to a safe
/// path. Contents are sealed with [`BlobCipher`] using the item key as
/// associated data.
#[derive(Debug)]
pub struct EncryptedFileStore {
    dir: PathBuf,
    cipher: BlobCipher,
}

impl EncryptedFileStore {
    /// Opens (creating if needed) the storage directory.
    pub async fn open(dir: impl Into<PathBuf>, cipher: BlobCipher) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700)).await {
                tracing::warn!(dir = %dir.display(), error = %e, "Could not restrict storage directory permissions");
            }
        }

        tracing::debug!(dir = %dir.display(), "Opened encrypted file store");
        Ok(Self { dir, cipher })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", hex::encode(key.as_bytes()), BLOB_EXTENSION))
    }
}

#[async_trait]
impl SecureStore for EncryptedFileStore {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let sealed = self.cipher.seal(value, key.as_bytes())?;
        let path = self.item_path(key);
        let tmp = path.with_extension(format!("{}.tmp", BLOB_EXTENSION));

        fs::write(&tmp, sealed.as_bytes()).await?;
        fs::rename(&tmp, &path).await?;

        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let sealed = match fs::read_to_string(self.item_path(key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(self.cipher.open(&sealed, key.as_bytes())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cipher(secret: &str) -> BlobCipher {
        BlobCipher::from_secret(secret).unwrap()
    }

    #[tokio::test]
    async fn test_missing_item_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = EncryptedFileStore::open(temp_dir.path(), cipher("secret"))
            .await
            .unwrap();

        assert_eq!(store.get_item("data").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_value_survives_reopen_and_is_encrypted() {
        let temp_dir = TempDir::new().unwrap();
        let value = r#"[{"id":0,"bank":"amex","name":"Alice","pin":"1234","cvc":"123"}]"#;

        {
            let store = EncryptedFileStore::open(temp_dir.path(), cipher("secret"))
                .await
                .unwrap();
            store.set_item("data", value).await.unwrap();
        }

        let on_disk = std::fs::read_to_string(temp_dir.path().join("64617461.blob")).unwrap();
        assert!(!on_disk.contains("Alice"));

        let reopened = EncryptedFileStore::open(temp_dir.path(), cipher("secret"))
            .await
            .unwrap();
        assert_eq!(reopened.get_item("data").await.unwrap().as_deref(), Some(value));
    }

    #[tokio::test]
    async fn test_wrong_secret_cannot_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = EncryptedFileStore::open(temp_dir.path(), cipher("secret"))
            .await
            .unwrap();
        store.set_item("data", "[]").await.unwrap();

        let other = EncryptedFileStore::open(temp_dir.path(), cipher("not-the-secret"))
            .await
            .unwrap();
        assert!(matches!(
            other.get_item("data").await,
            Err(StoreError::Encryption(_))
        ));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = EncryptedFileStore::open(temp_dir.path().join("nested"), cipher("secret"))
            .await
            .unwrap();

        store.set_item("data", "[1]").await.unwrap();
        store.set_item("data", "[2]").await.unwrap();

        assert_eq!(store.get_item("data").await.unwrap().as_deref(), Some("[2]"));
        assert!(!store.dir().join("64617461.blob.tmp").exists());
    }
}
