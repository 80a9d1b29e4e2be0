//! Testing utilities for the story wall.
//!
//! Fixtures for drafts and stories, a storage that always refuses writes,
//! and a ready-made in-memory session.

use crate::form::StoryForm;
use crate::session::{JourneySession, SessionConfig};
use crate::storage::{KeyValueStorage, MemoryStorage, StorageError};
use crate::story::{Draft, Identity, Story, StoryId};
use chrono::NaiveDate;
use std::time::Duration;

/// A filled-in form with the given identity and college.
pub fn sample_form(identity: Identity, college: &str) -> StoryForm {
    StoryForm {
        identity: Some(identity),
        graduation_year: "2020".to_string(),
        college: college.to_string(),
        target_person: "陈老师".to_string(),
        content: "那年冬天，您在办公室陪我改了三遍论文。".to_string(),
        image: None,
        author: String::new(),
    }
}

/// A draft with the given identity and college and a default author.
pub fn sample_draft(identity: Identity, college: &str) -> Draft {
    Draft {
        identity,
        college: college.to_string(),
        graduation_year: "2020".to_string(),
        target_person: "陈老师".to_string(),
        content: "那年冬天，您在办公室陪我改了三遍论文。".to_string(),
        image: None,
        author: crate::story::DEFAULT_AUTHOR.to_string(),
    }
}

/// A complete story with a fixed date.
pub fn sample_story(id: &str, identity: Identity, college: &str) -> Story {
    Story::from_draft(
        StoryId::new(id),
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap_or_default(),
        sample_draft(identity, college),
    )
}

/// Storage that reads nothing and rejects every write as over quota.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStorage;

impl KeyValueStorage for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, value: &str) -> Result<(), StorageError> {
        Err(StorageError::QuotaExceeded {
            limit: 0,
            attempted: value.len(),
        })
    }
}

/// A session over fresh in-memory storage with no submit delay.
///
/// Returns the storage handle alongside so tests can inspect what was written.
pub fn memory_session() -> (JourneySession, MemoryStorage) {
    let storage = MemoryStorage::new();
    let session = JourneySession::new(
        SessionConfig::new().with_submit_delay(Duration::ZERO),
        Box::new(storage.clone()),
    );
    (session, storage)
}
