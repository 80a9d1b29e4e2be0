//! Story store, view routing and wall filtering for the Shared Journey
//! story wall.
//!
//! This crate provides:
//! - The story record and the draft it is built from
//! - A key/value storage abstraction with file and in-memory backends
//! - The persistent store (fail-soft load, append, fire-and-forget persist, subscribe)
//! - The three-view router
//! - Form validation and photo encoding
//! - Wall filtering
//!
//! # Quick Start
//!
//! ```ignore
//! use journey_core::{FileStorage, JourneySession, SessionConfig, StoryForm, View};
//!
//! let storage = FileStorage::new("stories.json");
//! let mut session = JourneySession::new(SessionConfig::new(), Box::new(storage));
//!
//! session.navigate(View::Form);
//! let draft = form.validate()?;
//! let story = session.submit(draft);
//! assert_eq!(session.view(), View::Wall);
//! ```

pub mod form;
pub mod router;
pub mod session;
pub mod storage;
pub mod store;
pub mod story;
pub mod testing;
pub mod wall;

// Primary public API
pub use form::{FormError, FormField, StoryForm, SUBMIT_DELAY};
pub use router::{RouteAction, Transition, View, ViewRouter};
pub use session::{JourneySession, SessionConfig};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{StoryStore, STORAGE_KEY};
pub use story::{Draft, Identity, Story, StoryId, DEFAULT_AUTHOR};
pub use wall::{CollegeFilter, IdentityFilter, WallFilter};
