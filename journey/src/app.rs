//! Main application state and logic

use std::sync::Arc;
use std::time::{Duration, Instant};

use journey_core::{Draft, JourneySession, Story, Transition, View};
use tokio::sync::{mpsc, watch};

use crate::submission_form::SubmissionForm;
use crate::ui::theme::JourneyTheme;
use crate::ui::Overlay;

/// How long the success toast stays up.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Messages delivered to the UI loop by background tasks
#[derive(Debug)]
pub enum AppMessage {
    /// The submit delay elapsed; store the draft.
    SubmissionReady(Draft),
}

/// A transient notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub detail: String,
    shown_at: Instant,
}

impl Toast {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_DURATION
    }
}

/// Main application state
pub struct App {
    pub session: JourneySession,

    // Background task results
    message_tx: mpsc::UnboundedSender<AppMessage>,
    message_rx: mpsc::UnboundedReceiver<AppMessage>,

    // Footer counter, kept current through the store subscription
    stories_rx: watch::Receiver<Arc<Vec<Story>>>,
    story_count: usize,

    // UI state
    pub theme: JourneyTheme,
    pub form: SubmissionForm,
    overlay: Option<Overlay>,
    toast: Option<Toast>,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    pub animation_frame: u8,
}

impl App {
    pub fn new(session: JourneySession) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let stories_rx = session.subscribe();
        let story_count = stories_rx.borrow().len();

        Self {
            session,
            message_tx,
            message_rx,
            stories_rx,
            story_count,
            theme: JourneyTheme::default(),
            form: SubmissionForm::new(),
            overlay: None,
            toast: None,
            status_message: None,
            should_quit: false,
            animation_frame: 0,
        }
    }

    pub fn view(&self) -> View {
        self.session.view()
    }

    /// Switch views. Leaving the form discards whatever was typed.
    pub fn navigate(&mut self, view: View) -> Transition {
        let transition = self.session.navigate(view);
        if transition.left(View::Form) {
            self.form.reset();
        }
        self.clear_status();
        transition
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validate the form and start the submit delay.
    ///
    /// Returns `false` if the form was rejected or a submission is already
    /// pending.
    pub fn begin_submit(&mut self) -> bool {
        if self.form.submitting {
            return false;
        }

        let draft = match self.form.validate() {
            Ok(draft) => draft,
            Err(e) => {
                self.set_status(e.to_string());
                return false;
            }
        };

        self.form.begin_submit();
        self.set_status("提交中...");

        let tx = self.message_tx.clone();
        let delay = self.session.submit_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver only goes away when the app is shutting down
            let _ = tx.send(AppMessage::SubmissionReady(draft));
        });
        true
    }

    /// Handle every message that has arrived since the last call.
    pub fn drain_messages(&mut self) {
        while let Ok(message) = self.message_rx.try_recv() {
            self.handle_message(message);
        }
    }

    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::SubmissionReady(draft) => {
                // Lands on the wall even if the submitter navigated away
                // while waiting
                self.session.submit(draft);
                self.form.reset();
                self.clear_status();
                self.toast = Some(Toast::new("提交成功！", "您的故事已汇入共同的旅程。"));
                self.sync_story_count();
            }
        }
    }

    #[cfg(test)]
    async fn next_message(&mut self) -> Option<AppMessage> {
        self.message_rx.recv().await
    }

    // =========================================================================
    // Wall
    // =========================================================================

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.session.visible_stories().len().saturating_sub(1);
        let router = self.session.router_mut();
        router.scroll_down(lines);
        router.clamp_scroll(max);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.session.router_mut().scroll_up(lines);
    }

    pub fn scroll_to_top(&mut self) {
        let scroll = self.session.router().scroll();
        self.session.router_mut().scroll_up(scroll);
    }

    // =========================================================================
    // Ticks
    // =========================================================================

    /// Advance animations and expire the toast
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
        self.sync_story_count();
    }

    fn sync_story_count(&mut self) {
        if self.stories_rx.has_changed().unwrap_or(false) {
            self.story_count = self.stories_rx.borrow_and_update().len();
        }
    }

    pub fn story_count(&self) -> usize {
        self.story_count
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    // =========================================================================
    // Overlay and status
    // =========================================================================

    pub fn toggle_help(&mut self) {
        if matches!(self.overlay, Some(Overlay::Help)) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Help);
        }
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journey_core::testing::{memory_session, sample_draft, sample_form};
    use journey_core::Identity;

    fn app() -> App {
        let (session, _) = memory_session();
        App::new(session)
    }

    fn fill_form(app: &mut App) {
        app.navigate(View::Form);
        app.form.fields = sample_form(Identity::Faculty, "国际关系学院");
    }

    #[tokio::test]
    async fn test_delayed_submission_lands_on_wall() {
        let mut app = app();
        fill_form(&mut app);

        assert!(app.begin_submit());
        assert!(app.form.submitting);
        assert_eq!(app.view(), View::Form);
        assert_eq!(app.story_count(), 0);

        let message = app.next_message().await.expect("submission should complete");
        app.handle_message(message);

        assert_eq!(app.view(), View::Wall);
        assert!(!app.form.submitting);
        assert_eq!(app.story_count(), 1);
        assert_eq!(app.toast().map(|t| t.title.as_str()), Some("提交成功！"));
        assert_eq!(app.session.visible_stories()[0].college, "国际关系学院");
    }

    #[tokio::test]
    async fn test_second_submit_ignored_while_pending() {
        let mut app = app();
        fill_form(&mut app);

        assert!(app.begin_submit());
        assert!(!app.begin_submit());

        let message = app.next_message().await.unwrap();
        app.handle_message(message);
        assert_eq!(app.session.story_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_does_not_start_delay() {
        let mut app = app();
        app.navigate(View::Form);

        assert!(!app.begin_submit());
        assert!(!app.form.submitting);
        assert!(app.status_message().is_some());
        assert!(app.message_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_submission_completes_after_navigating_away() {
        let mut app = app();
        fill_form(&mut app);
        assert!(app.begin_submit());

        // Leaving the form mid-submit clears it but the story still arrives
        app.navigate(View::Landing);
        assert!(!app.form.submitting);

        let message = app.next_message().await.unwrap();
        app.handle_message(message);
        assert_eq!(app.view(), View::Wall);
        assert_eq!(app.session.story_count(), 1);
    }

    #[test]
    fn test_leaving_form_discards_input() {
        let mut app = app();
        fill_form(&mut app);
        app.navigate(View::Wall);
        app.navigate(View::Form);
        assert!(app.form.fields.identity.is_none());
    }

    #[test]
    fn test_wall_scroll_is_clamped() {
        let mut app = app();
        app.navigate(View::Wall);
        app.scroll_down(5);
        assert_eq!(app.session.router().scroll(), 0);
    }

    #[test]
    fn test_toast_expiry() {
        let mut toast = Toast::new("a", "b");
        assert!(!toast.is_expired());
        toast.shown_at = Instant::now() - TOAST_DURATION;
        assert!(toast.is_expired());
    }

    #[test]
    fn test_help_toggle() {
        let mut app = app();
        app.toggle_help();
        assert!(app.has_overlay());
        app.toggle_help();
        assert!(!app.has_overlay());
    }

    #[test]
    fn test_counter_starts_from_existing_stories() {
        let (mut session, _) = memory_session();
        session.submit(sample_draft(Identity::Alumni, "法学院"));
        session.submit(sample_draft(Identity::Student, "商学院"));
        assert_eq!(App::new(session).story_count(), 2);
    }
}
