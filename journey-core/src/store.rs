//! The persistent story store.
//!
//! Owns the in-memory collection, loads it once from durable storage and
//! writes the whole collection back after every append. Storage is treated
//! as untrusted: a missing, unreadable or malformed payload yields an empty
//! collection, and a failed write is logged while the in-memory collection
//! stays authoritative for the rest of the session.

use crate::storage::{KeyValueStorage, StorageError};
use crate::story::{Draft, Story, StoryId};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Storage key holding the serialized story array.
pub const STORAGE_KEY: &str = "gdufs_stories_data_v1";

/// Loaded ids above this are not used to seed the id counter, so a
/// hand-edited id near `i64::MAX` cannot exhaust the id space.
const MAX_SEED_ID: i64 = i64::MAX / 2;

/// Owner of the story collection.
pub struct StoryStore {
    storage: Box<dyn KeyValueStorage>,
    key: String,
    /// Newest-first collection; every change is published to subscribers.
    collection: watch::Sender<Arc<Vec<Story>>>,
    /// Highest numeric id handed out or loaded so far.
    last_id: i64,
}

impl StoryStore {
    /// Read the collection stored under `key`, failing soft.
    pub fn load(storage: &dyn KeyValueStorage, key: &str) -> Vec<Story> {
        let raw = match storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stories from storage; starting empty");
                return Vec::new();
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored stories are not valid JSON; starting empty");
                return Vec::new();
            }
        };

        let serde_json::Value::Array(records) = value else {
            tracing::warn!(key, "stored stories are not a sequence; starting empty");
            return Vec::new();
        };

        let total = records.len();
        let mut seen = HashSet::with_capacity(total);
        let mut stories = Vec::with_capacity(total);
        for record in records {
            match serde_json::from_value::<Story>(record) {
                Ok(story) if seen.insert(story.id.clone()) => stories.push(story),
                Ok(story) => {
                    tracing::debug!(id = %story.id, "skipping story with duplicate id");
                }
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable story record");
                }
            }
        }

        if stories.len() < total {
            tracing::warn!(
                key,
                kept = stories.len(),
                skipped = total - stories.len(),
                "dropped unreadable or duplicate story records"
            );
        }

        stories
    }

    /// Load the collection from `storage` and take ownership of it.
    pub fn open(storage: Box<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let stories = Self::load(&*storage, &key);
        let last_id = stories
            .iter()
            .filter_map(|s| s.id.as_str().parse::<i64>().ok())
            .filter(|id| *id <= MAX_SEED_ID)
            .max()
            .unwrap_or(0);

        tracing::info!(key = %key, count = stories.len(), "opened story store");

        let (collection, _) = watch::channel(Arc::new(stories));
        Self {
            storage,
            key,
            collection,
            last_id,
        }
    }

    /// Complete `draft` with a fresh id and today's date, prepend it and persist.
    pub fn append(&mut self, draft: Draft) -> Story {
        let id = self.next_id();
        let story = Story::from_draft(id, Utc::now().date_naive(), draft);

        self.collection
            .send_modify(|stories| Arc::make_mut(stories).insert(0, story.clone()));
        tracing::debug!(id = %story.id, count = self.len(), "appended story");

        self.persist();
        story
    }

    /// Write the full collection to storage.
    ///
    /// Returns `false` if the write failed. Failures are logged and never
    /// propagated; the in-memory collection is unaffected.
    pub fn persist(&mut self) -> bool {
        match self.try_persist() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to persist stories; keeping them in memory");
                false
            }
        }
    }

    fn try_persist(&mut self) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&**self.collection.borrow())?;
        self.storage.set(&self.key, &payload)
    }

    /// Generate an id from the current time in milliseconds, strictly
    /// increasing within the session and never colliding with a loaded id.
    fn next_id(&mut self) -> StoryId {
        let mut candidate = Utc::now()
            .timestamp_millis()
            .max(self.last_id.saturating_add(1));
        let stories = self.collection.borrow();
        while stories
            .iter()
            .any(|s| s.id.as_str() == candidate.to_string())
        {
            candidate = candidate.saturating_add(1);
        }
        self.last_id = candidate;
        StoryId::new(candidate.to_string())
    }

    /// Snapshot of the current collection, newest first.
    pub fn stories(&self) -> Arc<Vec<Story>> {
        self.collection.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.collection.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observe the collection. The receiver is notified after every append.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Story>>> {
        self.collection.subscribe()
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::story::Identity;
    use crate::testing::{sample_draft, FailingStorage};

    fn open_memory(storage: &MemoryStorage) -> StoryStore {
        StoryStore::open(Box::new(storage.clone()), STORAGE_KEY)
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let storage = MemoryStorage::new();
        assert!(StoryStore::load(&storage, STORAGE_KEY).is_empty());
    }

    #[test]
    fn test_load_malformed_payloads_are_empty() {
        for raw in ["{not json", "{\"id\":\"1\"}", "42", "\"stories\"", "null"] {
            let storage = MemoryStorage::new();
            storage.insert_raw(STORAGE_KEY, raw);
            assert!(
                StoryStore::load(&storage, STORAGE_KEY).is_empty(),
                "payload {raw:?} should load as empty"
            );
        }
    }

    #[test]
    fn test_load_keeps_valid_records() {
        let storage = MemoryStorage::new();
        storage.insert_raw(
            STORAGE_KEY,
            r#"[
                {"id":"2","identity":"faculty","college":"A","graduationYear":"","targetPerson":"T","content":"C","author":"X","date":"2024-01-02"},
                {"id":"3","identity":"wizard"},
                7,
                {"id":"2","identity":"student","college":"B","graduationYear":"","targetPerson":"T","content":"C","author":"Y","date":"2024-01-01"},
                {"id":"1","identity":"student","college":"B","graduationYear":"","targetPerson":"T","content":"C","author":"Y","date":"2024-01-01"}
            ]"#,
        );

        let stories = StoryStore::load(&storage, STORAGE_KEY);
        let ids: Vec<_> = stories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(stories[0].identity, Identity::Faculty);
    }

    #[test]
    fn test_append_prepends_and_persists() {
        let storage = MemoryStorage::new();
        let mut store = open_memory(&storage);

        let first = store.append(sample_draft(Identity::Student, "外国语言文化学院"));
        let second = store.append(sample_draft(Identity::Alumni, "法学院"));

        let stories = store.stories();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].id, second.id);
        assert_eq!(stories[1].id, first.id);
        assert_eq!(second.date, Utc::now().date_naive());

        let persisted: Vec<Story> =
            serde_json::from_str(&storage.raw(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(persisted.as_slice(), stories.as_slice());
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let storage = MemoryStorage::new();
        let mut store = open_memory(&storage);

        let ids: Vec<i64> = (0..50)
            .map(|_| store.append(sample_draft(Identity::Faculty, "英语语言文化学院")))
            .map(|s| s.id.as_str().parse().unwrap())
            .collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_append_after_max_value_id() {
        let storage = MemoryStorage::new();
        storage.insert_raw(
            STORAGE_KEY,
            &format!(
                r#"[{{"id":"{}","identity":"alumni","college":"A","graduationYear":"","targetPerson":"T","content":"C","author":"X","date":"2024-01-02"}}]"#,
                i64::MAX
            ),
        );
        let mut store = open_memory(&storage);

        let first = store.append(sample_draft(Identity::Student, "法学院"));
        let second = store.append(sample_draft(Identity::Student, "法学院"));

        let first_id: i64 = first.id.as_str().parse().unwrap();
        let second_id: i64 = second.id.as_str().parse().unwrap();
        assert!(first_id < second_id);
        assert_ne!(first.id.as_str(), i64::MAX.to_string());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_ids_skip_loaded_future_ids() {
        let storage = MemoryStorage::new();
        let far_future = Utc::now().timestamp_millis() + 1_000_000;
        storage.insert_raw(
            STORAGE_KEY,
            &format!(
                r#"[{{"id":"{far_future}","identity":"alumni","college":"A","graduationYear":"","targetPerson":"T","content":"C","author":"X","date":"2024-01-02"}}]"#
            ),
        );

        let mut store = open_memory(&storage);
        let story = store.append(sample_draft(Identity::Student, "A"));
        assert_eq!(story.id.as_str(), (far_future + 1).to_string());
    }

    #[test]
    fn test_persist_failure_keeps_memory() {
        let mut store = StoryStore::open(Box::new(FailingStorage), STORAGE_KEY);
        let story = store.append(sample_draft(Identity::Alumni, "国际关系学院"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.stories()[0].id, story.id);
        assert!(!store.persist());
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_payload() {
        let storage = MemoryStorage::new().with_quota(Some(2048));
        let mut store = open_memory(&storage);
        store.append(sample_draft(Identity::Student, "A"));
        let saved = storage.raw(STORAGE_KEY).unwrap();

        let mut big = sample_draft(Identity::Student, "B");
        big.image = Some(format!("data:image/png;base64,{}", "A".repeat(4096)));
        store.append(big);

        assert_eq!(store.len(), 2);
        assert_eq!(storage.raw(STORAGE_KEY).unwrap(), saved);
    }

    #[test]
    fn test_subscribers_see_appends() {
        let storage = MemoryStorage::new();
        let mut store = open_memory(&storage);
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.append(sample_draft(Identity::Faculty, "A"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
