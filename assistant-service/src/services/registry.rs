//! Assistant registry: the keyed store behind the HTTP handlers.

use super::error::RegistryError;
use crate::models::{Assistant, UpsertOutcome, Upserted};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Storage for assistant records, keyed by exact (case-sensitive) name.
///
/// Implementations must make each call atomic: concurrent upserts of one
/// name never interleave and readers never see a half-written record.
pub trait AssistantStore: Send + Sync {
    /// Create or replace the response text for `name`, reporting which happened.
    fn upsert(&self, name: &str, response_text: &str) -> Result<Upserted, RegistryError>;

    fn find_by_name(&self, name: &str) -> Result<Option<Assistant>, RegistryError>;

    fn exists_by_name(&self, name: &str) -> Result<bool, RegistryError>;

    /// Remove and return the record, or `RegistryError::NotFound`.
    fn delete_by_name(&self, name: &str) -> Result<Assistant, RegistryError>;

    /// All records, newest `created_at` first.
    fn list_all(&self) -> Result<Vec<Assistant>, RegistryError>;

    fn count(&self) -> Result<usize, RegistryError>;

    fn health_check(&self) -> Result<(), RegistryError>;
}

struct Entry {
    // Insertion order, breaks created_at ties in list_all.
    seq: u64,
    assistant: Assistant,
}

#[derive(Default)]
struct Table {
    records: HashMap<String, Entry>,
    next_seq: u64,
}

/// Process-local store. One lock guards the whole table, so writes are
/// serialised and a delete racing an upsert of the same name resolves as
/// last writer wins.
#[derive(Default)]
pub struct InMemoryAssistantStore {
    table: RwLock<Table>,
}

impl InMemoryAssistantStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, RegistryError> {
        self.table.read().map_err(|e| {
            tracing::error!("Assistant table lock poisoned: {}", e);
            RegistryError::Internal(anyhow::anyhow!("Assistant store is unavailable"))
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>, RegistryError> {
        self.table.write().map_err(|e| {
            tracing::error!("Assistant table lock poisoned: {}", e);
            RegistryError::Internal(anyhow::anyhow!("Assistant store is unavailable"))
        })
    }
}

impl AssistantStore for InMemoryAssistantStore {
    fn upsert(&self, name: &str, response_text: &str) -> Result<Upserted, RegistryError> {
        let mut table = self.write()?;

        if let Some(entry) = table.records.get_mut(name) {
            entry
                .assistant
                .set_response_text(response_text.to_string());
            return Ok(Upserted {
                assistant: entry.assistant.clone(),
                outcome: UpsertOutcome::Updated,
            });
        }

        let assistant = Assistant::new(name.to_string(), response_text.to_string());
        let seq = table.next_seq;
        table.next_seq += 1;
        table.records.insert(
            name.to_string(),
            Entry {
                seq,
                assistant: assistant.clone(),
            },
        );

        Ok(Upserted {
            assistant,
            outcome: UpsertOutcome::Created,
        })
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Assistant>, RegistryError> {
        Ok(self
            .read()?
            .records
            .get(name)
            .map(|entry| entry.assistant.clone()))
    }

    fn exists_by_name(&self, name: &str) -> Result<bool, RegistryError> {
        Ok(self.read()?.records.contains_key(name))
    }

    fn delete_by_name(&self, name: &str) -> Result<Assistant, RegistryError> {
        self.write()?
            .records
            .remove(name)
            .map(|entry| entry.assistant)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    fn list_all(&self) -> Result<Vec<Assistant>, RegistryError> {
        let table = self.read()?;
        let mut entries: Vec<&Entry> = table.records.values().collect();
        entries.sort_by(|a, b| {
            b.assistant
                .created_at
                .cmp(&a.assistant.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(entries.into_iter().map(|e| e.assistant.clone()).collect())
    }

    fn count(&self) -> Result<usize, RegistryError> {
        Ok(self.read()?.records.len())
    }

    fn health_check(&self) -> Result<(), RegistryError> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn upsert_new_name_creates() {
        let store = InMemoryAssistantStore::new();

        let result = store.upsert("Bot", "Hi").unwrap();

        assert!(result.was_created());
        assert_eq!(result.assistant.name, "Bot");
        assert_eq!(result.assistant.response_text, "Hi");
        assert_eq!(result.assistant.created_at, result.assistant.updated_at);
    }

    #[test]
    fn upsert_existing_name_updates_in_place() {
        let store = InMemoryAssistantStore::new();
        let first = store.upsert("Bot", "Hi").unwrap().assistant;

        let second = store.upsert("Bot", "Hello there").unwrap();

        assert!(!second.was_created());
        assert_eq!(second.outcome, UpsertOutcome::Updated);
        assert_eq!(second.assistant.id, first.id);
        assert_eq!(second.assistant.created_at, first.created_at);
        assert!(second.assistant.updated_at > first.updated_at);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn find_returns_latest_text_and_is_case_sensitive() {
        let store = InMemoryAssistantStore::new();
        store.upsert("Bot", "Hi").unwrap();
        store.upsert("Bot", "Bye").unwrap();

        let found = store.find_by_name("Bot").unwrap().unwrap();
        assert_eq!(found.response_text, "Bye");
        assert!(store.find_by_name("bot").unwrap().is_none());
        assert!(!store.exists_by_name("BOT").unwrap());
    }

    #[test]
    fn list_all_is_newest_first() {
        let store = InMemoryAssistantStore::new();
        store.upsert("first", "1").unwrap();
        store.upsert("second", "2").unwrap();
        store.upsert("third", "3").unwrap();
        // Updating must not reorder.
        store.upsert("first", "1b").unwrap();

        let names: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();

        assert_eq!(names, vec!["third", "second", "first"]);
        for pair in store.list_all().unwrap().windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn delete_removes_and_second_delete_is_not_found() {
        let store = InMemoryAssistantStore::new();
        store.upsert("Bot", "Hi").unwrap();

        let removed = store.delete_by_name("Bot").unwrap();
        assert_eq!(removed.name, "Bot");
        assert!(!store.exists_by_name("Bot").unwrap());

        match store.delete_by_name("Bot") {
            Err(RegistryError::NotFound(name)) => assert_eq!(name, "Bot"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn recreate_after_delete_gets_fresh_identity() {
        let store = InMemoryAssistantStore::new();
        let original = store.upsert("Bot", "Hi").unwrap().assistant;
        store.delete_by_name("Bot").unwrap();

        let recreated = store.upsert("Bot", "Hi again").unwrap();

        assert!(recreated.was_created());
        assert_ne!(recreated.assistant.id, original.id);
    }

    #[test]
    fn count_matches_list_length() {
        let store = InMemoryAssistantStore::new();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.list_all().unwrap().is_empty());

        for name in ["a", "b", "c", "b"] {
            store.upsert(name, "text").unwrap();
            assert_eq!(store.count().unwrap(), store.list_all().unwrap().len());
        }
        store.delete_by_name("a").unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn concurrent_upserts_of_one_name_create_exactly_once() {
        let store = Arc::new(InMemoryAssistantStore::new());

        let outcomes: Vec<UpsertOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let store = Arc::clone(&store);
                    scope.spawn(move || store.upsert("Shared", &format!("text {}", i)).unwrap())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().outcome)
                .collect()
        });

        let created = outcomes
            .iter()
            .filter(|o| **o == UpsertOutcome::Created)
            .count();
        assert_eq!(created, 1);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn poisoned_lock_surfaces_as_internal_error() {
        let store = Arc::new(InMemoryAssistantStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.table.write().unwrap();
            panic!("poison the table");
        })
        .join();

        assert!(matches!(store.count(), Err(RegistryError::Internal(_))));
        assert!(matches!(
            store.health_check(),
            Err(RegistryError::Internal(_))
        ));
    }
}
