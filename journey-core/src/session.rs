//! JourneySession - the root controller.
//!
//! Ties the story store, the view router and the wall filter together. UI
//! front ends (the TUI and the headless protocol) hold one session and drive
//! it with navigation and submissions.

use crate::router::{RouteAction, Transition, View, ViewRouter};
use crate::storage::KeyValueStorage;
use crate::store::{StoryStore, STORAGE_KEY};
use crate::story::{Draft, Story};
use crate::wall::{college_options, CollegeFilter, IdentityFilter, WallFilter};
use crate::form::SUBMIT_DELAY;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Storage key holding the story array.
    pub storage_key: String,

    /// Pause between pressing submit and the story being stored.
    pub submit_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            submit_delay: SUBMIT_DELAY,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }
}

/// A story wall session.
///
/// Filter state is scoped to a visit of the wall: arriving at the wall from
/// another view starts unfiltered, while the collection itself survives any
/// amount of navigation.
pub struct JourneySession {
    store: StoryStore,
    router: ViewRouter,
    filter: WallFilter,
    config: SessionConfig,
}

impl JourneySession {
    /// Open a session, loading whatever `storage` holds.
    pub fn new(config: SessionConfig, storage: Box<dyn KeyValueStorage>) -> Self {
        let store = StoryStore::open(storage, config.storage_key.clone());
        Self {
            store,
            router: ViewRouter::new(),
            filter: WallFilter::new(),
            config,
        }
    }

    // =========================================================================
    // Routing
    // =========================================================================

    pub fn view(&self) -> View {
        self.router.current()
    }

    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut ViewRouter {
        &mut self.router
    }

    /// Navigate to `view`.
    pub fn navigate(&mut self, view: View) -> Transition {
        self.route(RouteAction::Navigate(view))
    }

    fn route(&mut self, action: RouteAction) -> Transition {
        let transition = self.router.dispatch(action);
        if transition.entered(View::Wall) {
            self.filter.reset();
        }
        transition
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Store a completed draft and show the wall.
    pub fn submit(&mut self, draft: Draft) -> Story {
        let story = self.store.append(draft);
        tracing::info!(id = %story.id, identity = %story.identity, "story submitted");
        self.route(RouteAction::SubmissionSucceeded);
        story
    }

    pub fn submit_delay(&self) -> Duration {
        self.config.submit_delay
    }

    // =========================================================================
    // Collection
    // =========================================================================

    pub fn stories(&self) -> Arc<Vec<Story>> {
        self.store.stories()
    }

    pub fn story_count(&self) -> usize {
        self.store.len()
    }

    pub fn store(&self) -> &StoryStore {
        &self.store
    }

    /// Observe the collection; notified after every submission.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Story>>> {
        self.store.subscribe()
    }

    // =========================================================================
    // Wall filtering
    // =========================================================================

    pub fn filter(&self) -> &WallFilter {
        &self.filter
    }

    pub fn set_identity_filter(&mut self, identity: IdentityFilter) {
        self.filter.identity = identity;
    }

    pub fn set_college_filter(&mut self, college: CollegeFilter) {
        self.filter.college = college;
    }

    /// Move the college filter to the next (or previous) available option.
    pub fn cycle_college_filter(&mut self, forward: bool) {
        let options = self.college_options();
        self.filter.college = self.filter.college.cycle(&options, forward);
    }

    pub fn reset_filter(&mut self) {
        self.filter.reset();
    }

    /// Stories matching the active filter, newest first.
    pub fn visible_stories(&self) -> Vec<Story> {
        let stories = self.store.stories();
        self.filter.apply(&stories).into_iter().cloned().collect()
    }

    pub fn college_options(&self) -> Vec<String> {
        college_options(&self.store.stories())
    }
}
