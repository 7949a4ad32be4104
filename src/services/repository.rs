use crate::models::card::{deserialize_cards, serialize_cards, CardInput, CardRecord, IdPolicy};
use crate::services::persistence::PersistenceHandle;

/// In-memory card collection mirrored to the secure store.
///
/// The in-memory list is authoritative for the session. Every mutation is
/// applied here first and then the whole collection is queued for writing;
/// write failures are logged by the persistence task and otherwise ignored.
pub struct CardRepository {
    cards: Vec<CardRecord>,
    ids: IdPolicy,
    persistence: PersistenceHandle,
    revision: u64,
}

impl CardRepository {
    pub fn new(persistence: PersistenceHandle, ids: IdPolicy) -> Self {
        Self {
            cards: Vec::new(),
            ids,
            persistence,
            revision: 0,
        }
    }

    /// Newest first.
    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }

    /// Replaces the in-memory collection with the stored one.
    ///
    /// Missing, unreadable or unparsable data yields an empty collection.
    pub async fn load(&mut self) -> &[CardRecord] {
        self.cards = match self.persistence.load().await {
            Some(blob) => deserialize_cards(&blob).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored cards could not be parsed, starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };

        tracing::info!(count = self.cards.len(), "Loaded cards");
        &self.cards
    }

    pub fn add(&mut self, input: CardInput) -> CardRecord {
        let record = input.into_record(self.ids.next_id(&self.cards));
        self.cards.insert(0, record.clone());

        tracing::info!(id = record.id, bank = %record.bank, "Added card");
        self.persist();
        record
    }

    /// Overwrites the first record carrying `id`. Returns false, without
    /// writing anything, when no record matches.
    pub fn update(&mut self, id: u64, input: CardInput) -> bool {
        let Some(record) = self.cards.iter_mut().find(|c| c.id == id) else {
            tracing::debug!(id, "Update skipped, no card with this id");
            return false;
        };

        record.apply(input);
        tracing::info!(id, "Updated card");
        self.persist();
        true
    }

    /// Removes every record carrying `id` and returns how many were removed.
    pub fn remove(&mut self, id: u64) -> usize {
        let before = self.cards.len();
        self.cards.retain(|c| c.id != id);
        let removed = before - self.cards.len();

        if removed == 0 {
            tracing::debug!(id, "Remove skipped, no card with this id");
            return 0;
        }

        tracing::info!(id, removed, "Removed card");
        self.persist();
        removed
    }

    /// Waits for all queued writes to reach the store.
    pub async fn flush(&self) {
        self.persistence.flush().await;
    }

    fn persist(&mut self) {
        self.revision += 1;
        match serialize_cards(&self.cards) {
            Ok(payload) => self.persistence.persist(self.revision, payload),
            Err(e) => tracing::warn!(revision = self.revision, error = %e, "Failed to serialize cards"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SecureStore};
    use std::sync::Arc;

    fn repository(store: &Arc<MemoryStore>, ids: IdPolicy) -> CardRepository {
        let (handle, _task) = PersistenceHandle::spawn(store.clone(), "data");
        CardRepository::new(handle, ids)
    }

    fn ids(repo: &CardRepository) -> Vec<u64> {
        repo.cards().iter().map(|c| c.id).collect()
    }

    #[tokio::test]
    async fn test_add_to_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store, IdPolicy::Length);
        repo.load().await;

        let card = repo.add(CardInput::new("amex", "Alice", "1234", "123"));
        repo.flush().await;

        let expected = CardRecord {
            id: 0,
            bank: "amex".to_string(),
            name: "Alice".to_string(),
            pin: "1234".to_string(),
            cvc: "123".to_string(),
        };
        assert_eq!(card, expected);
        assert_eq!(repo.cards(), &[expected.clone()]);
        assert_eq!(
            store.peek("data").await,
            Some(serialize_cards(&[expected]).unwrap())
        );
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store, IdPolicy::Length);

        for name in ["a", "b", "c", "d"] {
            repo.add(CardInput::new("hsbc", name, "", ""));
            assert_eq!(repo.cards()[0].name, name);
        }

        let names: Vec<_> = repo.cards().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["d", "c", "b", "a"]);
        assert_eq!(ids(&repo), [3, 2, 1, 0]);
    }

    #[tokio::test]
    async fn test_empty_fields_are_kept() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store, IdPolicy::Length);

        let card = repo.add(CardInput::default());
        assert_eq!(card.bank, "");
        assert_eq!(card.name, "");
    }

    #[tokio::test]
    async fn test_remove_then_reload() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store, IdPolicy::Length);
        repo.add(CardInput::new("amex", "Alice", "1", "1"));
        repo.add(CardInput::new("natwest", "Bob", "2", "2"));

        assert_eq!(repo.remove(0), 1);
        repo.flush().await;

        let mut restarted = repository(&store, IdPolicy::Length);
        let loaded = restarted.load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 1);
        assert_eq!(loaded[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_length_ids_repeat_after_remove() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store, IdPolicy::Length);
        repo.add(CardInput::new("amex", "Alice", "", ""));
        repo.add(CardInput::new("hsbc", "Bob", "", ""));

        repo.remove(0);
        assert_eq!(ids(&repo), [1]);

        let card = repo.add(CardInput::new("virgin", "Carol", "", ""));
        assert_eq!(card.id, 1);
        assert_eq!(ids(&repo), [1, 1]);

        // Both records share the id now, so both go.
        assert_eq!(repo.remove(1), 2);
        assert!(repo.cards().is_empty());
    }

    #[tokio::test]
    async fn test_monotonic_ids_do_not_repeat() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store, IdPolicy::Monotonic);
        repo.add(CardInput::new("amex", "Alice", "", ""));
        repo.add(CardInput::new("hsbc", "Bob", "", ""));

        repo.remove(0);
        let card = repo.add(CardInput::new("virgin", "Carol", "", ""));
        assert_eq!(card.id, 2);
        assert_eq!(ids(&repo), [2, 1]);
    }

    #[tokio::test]
    async fn test_update_in_place() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store, IdPolicy::Length);
        repo.add(CardInput::new("amex", "Alice", "1", "1"));
        repo.add(CardInput::new("hsbc", "Bob", "2", "2"));

        assert!(repo.update(0, CardInput::new("Barclays", "Alice B", "9", "8")));
        repo.flush().await;

        let updated = &repo.cards()[1];
        assert_eq!(updated.id, 0);
        assert_eq!(updated.bank, "barclays");
        assert_eq!(updated.name, "Alice B");

        let stored = deserialize_cards(&store.peek("data").await.unwrap()).unwrap();
        assert_eq!(stored, repo.cards());
    }

    #[tokio::test]
    async fn test_missing_id_is_a_noop() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store, IdPolicy::Length);
        repo.add(CardInput::new("amex", "Alice", "", ""));
        repo.flush().await;
        let writes = store.write_count();

        assert!(!repo.update(7, CardInput::new("hsbc", "Nobody", "", "")));
        assert_eq!(repo.remove(7), 0);
        repo.flush().await;

        assert_eq!(repo.cards().len(), 1);
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_unparsable_blob_loads_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set_item("data", "{broken").await.unwrap();
        let mut repo = repository(&store, IdPolicy::Length);

        assert!(repo.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes(true);
        let mut repo = repository(&store, IdPolicy::Length);

        repo.add(CardInput::new("amex", "Alice", "", ""));
        repo.flush().await;

        assert_eq!(repo.cards().len(), 1);
        assert_eq!(store.peek("data").await, None);
    }

    #[tokio::test]
    async fn test_rapid_mutations_persist_latest_state() {
        let store = Arc::new(MemoryStore::new());
        let mut repo = repository(&store, IdPolicy::Monotonic);

        for i in 0..20 {
            repo.add(CardInput::new("amex", format!("card {}", i), "", ""));
            if i % 3 == 0 {
                repo.remove(i / 2);
            }
        }
        repo.flush().await;

        let stored = deserialize_cards(&store.peek("data").await.unwrap()).unwrap();
        assert_eq!(stored, repo.cards());
    }
}
