//! Single-writer queue in front of the secure store.
//!
//! One task owns the store and applies commands strictly in the order they
//! were queued, so a snapshot can never be overwritten by an older one and a
//! load always observes every write queued before it.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::store::SecureStore;

enum Command {
    Persist { revision: u64, payload: String },
    Load { reply: oneshot::Sender<Option<String>> },
    Flush { reply: oneshot::Sender<()> },
}

/// Cloneable handle to the writer task for one item key.
#[derive(Clone)]
pub struct PersistenceHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistenceHandle {
    /// Spawns the writer task. Must be called from within a tokio runtime.
    ///
    /// The task exits once every handle has been dropped and the queue is
    /// drained.
    pub fn spawn(store: Arc<dyn SecureStore>, item_key: impl Into<String>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_writer(store, item_key.into(), rx));
        (Self { tx }, task)
    }

    /// Queues a full snapshot for writing and returns immediately.
    pub fn persist(&self, revision: u64, payload: String) {
        if self.tx.send(Command::Persist { revision, payload }).is_err() {
            tracing::warn!(revision, "Persistence task stopped, snapshot dropped");
        }
    }

    /// Reads the stored blob after all previously queued writes.
    ///
    /// Read failures are logged and reported as `None`.
    pub async fn load(&self) -> Option<String> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Load { reply }).is_err() {
            tracing::warn!("Persistence task stopped, nothing to load");
            return None;
        }
        rx.await.ok().flatten()
    }

    /// Waits until every snapshot queued so far has been written (or has
    /// failed).
    pub async fn flush(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Flush { reply }).is_ok() {
            let _ = rx.await;
        }
    }
}

async fn run_writer(
    store: Arc<dyn SecureStore>,
    item_key: String,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Persist { revision, payload } => {
                match store.set_item(&item_key, &payload).await {
                    Ok(()) => tracing::debug!(revision, bytes = payload.len(), "Persisted cards"),
                    Err(e) => tracing::warn!(revision, error = %e, "Failed to persist cards"),
                }
            }
            Command::Load { reply } => {
                let value = match store.get_item(&item_key).await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read stored cards");
                        None
                    }
                };
                let _ = reply.send(value);
            }
            Command::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }

    tracing::debug!("Persistence task finished");
}
