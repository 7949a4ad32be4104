//! Wiring of the card screen from configuration.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    challenge::Challenger, encryption::BlobCipher, gate::AuthorizationGate,
    persistence::PersistenceHandle, repository::CardRepository,
};
use crate::store::{EncryptedFileStore, SecureStore};
use crate::ui::CardSession;

/// Builds a session over the given store.
///
/// Returns the persistence task handle alongside the session; it finishes
/// once the session is dropped and queued writes are done.
pub fn build_session(
    config: &Config,
    store: Arc<dyn SecureStore>,
    challenger: Arc<dyn Challenger>,
) -> (CardSession, JoinHandle<()>) {
    let gate = AuthorizationGate::new(challenger, config.prompt_message.clone());
    let (persistence, task) = PersistenceHandle::spawn(store, config.item_key.clone());
    let repository = CardRepository::new(persistence, config.id_policy);

    (CardSession::new(gate, repository), task)
}

/// Opens the encrypted file store named by the configuration and builds a
/// session over it.
pub async fn open_session(
    config: &Config,
    challenger: Arc<dyn Challenger>,
) -> Result<(CardSession, JoinHandle<()>)> {
    use secrecy::ExposeSecret;

    let cipher = BlobCipher::from_secret(config.storage_secret.expose_secret())?;
    let store = EncryptedFileStore::open(&config.storage_dir, cipher).await?;

    tracing::info!(dir = %store.dir().display(), item_key = %config.item_key, "Card store ready");
    Ok(build_session(config, Arc::new(store), challenger))
}
