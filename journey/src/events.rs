//! Event handling for the story wall TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use journey_core::{Identity, IdentityFilter, View};

use crate::app::App;
use crate::submission_form::FormCommand;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a mouse event
fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    if app.view() != View::Wall {
        return EventResult::Continue;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(1);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(1);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    // Header navigation
    match key.code {
        KeyCode::F(1) => {
            app.toggle_help();
            return EventResult::NeedsRedraw;
        }
        KeyCode::F(2) => return navigate(app, View::Landing),
        KeyCode::F(3) => return navigate(app, View::Form),
        KeyCode::F(4) => return navigate(app, View::Wall),
        _ => {}
    }

    match app.view() {
        View::Landing => handle_landing_key(app, key),
        View::Form => handle_form_key(app, key),
        View::Wall => handle_wall_key(app, key),
    }
}

fn navigate(app: &mut App, view: View) -> EventResult {
    app.navigate(view);
    EventResult::NeedsRedraw
}

/// Handle keys while the help overlay is open
fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::F(1) => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle keys on the landing page
fn handle_landing_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('s') | KeyCode::Enter => navigate(app, View::Form),
        KeyCode::Char('w') => navigate(app, View::Wall),
        KeyCode::Char('?') => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,
        _ => EventResult::Continue,
    }
}

/// Handle keys on the submission form
fn handle_form_key(app: &mut App, key: KeyEvent) -> EventResult {
    match app.form.handle_key(key) {
        FormCommand::Submit => {
            app.begin_submit();
            EventResult::NeedsRedraw
        }
        FormCommand::Leave => navigate(app, View::Landing),
        FormCommand::None => EventResult::NeedsRedraw,
    }
}

/// Handle keys on the story wall
fn handle_wall_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        // Identity filter
        KeyCode::Char('a') => {
            app.session.set_identity_filter(IdentityFilter::All);
            app.scroll_to_top();
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c @ '1'..='3') => {
            let index = usize::from(c as u8 - b'1');
            if let Some(identity) = Identity::all().get(index) {
                app.session.set_identity_filter(IdentityFilter::Only(*identity));
                app.scroll_to_top();
            }
            EventResult::NeedsRedraw
        }

        // College filter
        KeyCode::Char('c') => {
            app.session.cycle_college_filter(true);
            app.scroll_to_top();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('C') => {
            app.session.cycle_college_filter(false);
            app.scroll_to_top();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('r') => {
            app.session.reset_filter();
            app.scroll_to_top();
            EventResult::NeedsRedraw
        }

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_down(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_up(1);
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(5);
            EventResult::NeedsRedraw
        }
        KeyCode::PageUp => {
            app.scroll_up(5);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.scroll_to_top();
            EventResult::NeedsRedraw
        }

        KeyCode::Char('s') => navigate(app, View::Form),
        KeyCode::Esc => navigate(app, View::Landing),
        KeyCode::Char('?') => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,
        _ => EventResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journey_core::testing::{memory_session, sample_draft};
    use journey_core::CollegeFilter;

    fn press(app: &mut App, code: KeyCode) -> EventResult {
        handle_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn wall_app() -> App {
        let (mut session, _) = memory_session();
        session.submit(sample_draft(Identity::Student, "法学院"));
        session.submit(sample_draft(Identity::Alumni, "商学院"));
        session.submit(sample_draft(Identity::Faculty, "法学院"));
        App::new(session)
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (session, _) = memory_session();
        let mut app = App::new(session);
        app.navigate(View::Form);
        let result = handle_event(
            &mut app,
            Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert_eq!(result, EventResult::Quit);
    }

    #[test]
    fn test_function_keys_navigate() {
        let (session, _) = memory_session();
        let mut app = App::new(session);
        press(&mut app, KeyCode::F(3));
        assert_eq!(app.view(), View::Form);
        press(&mut app, KeyCode::F(4));
        assert_eq!(app.view(), View::Wall);
        press(&mut app, KeyCode::F(2));
        assert_eq!(app.view(), View::Landing);
    }

    #[test]
    fn test_landing_keys() {
        let (session, _) = memory_session();
        let mut app = App::new(session);
        press(&mut app, KeyCode::Char('w'));
        assert_eq!(app.view(), View::Wall);
        app.navigate(View::Landing);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.view(), View::Form);
    }

    #[test]
    fn test_typing_q_in_form_does_not_quit() {
        let (session, _) = memory_session();
        let mut app = App::new(session);
        app.navigate(View::Form);
        app.form.set_focus(crate::submission_form::FormFocus::College);
        assert_eq!(press(&mut app, KeyCode::Char('q')), EventResult::NeedsRedraw);
        assert_eq!(app.form.fields.college, "q");
    }

    #[test]
    fn test_wall_filter_keys() {
        let mut app = wall_app();
        app.navigate(View::Wall);

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.session.visible_stories().len(), 1);
        assert_eq!(app.session.visible_stories()[0].identity, Identity::Alumni);

        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(
            app.session.filter().college,
            CollegeFilter::Exactly(app.session.college_options()[0].clone())
        );

        press(&mut app, KeyCode::Char('r'));
        assert!(app.session.filter().is_unrestricted());
        assert_eq!(app.session.visible_stories().len(), 3);
    }

    #[test]
    fn test_wall_scroll_keys() {
        let mut app = wall_app();
        app.navigate(View::Wall);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.session.router().scroll(), 2);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.session.router().scroll(), 0);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let (session, _) = memory_session();
        let mut app = App::new(session);
        press(&mut app, KeyCode::F(1));
        assert!(app.has_overlay());
        assert_eq!(press(&mut app, KeyCode::Char('w')), EventResult::Continue);
        assert_eq!(app.view(), View::Landing);
        press(&mut app, KeyCode::Esc);
        assert!(!app.has_overlay());
    }
}
