//! View routing.
//!
//! A three-state machine choosing which screen is visible. Every state is
//! reachable from every other by an explicit navigation; a successful
//! submission also lands on the wall. Each transition resets the scroll
//! position of the content area to the top.

/// The screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Landing,
    Form,
    Wall,
}

impl View {
    pub fn all() -> &'static [View] {
        &[View::Landing, View::Form, View::Wall]
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::Landing => "landing",
            View::Form => "form",
            View::Wall => "wall",
        }
    }

    /// Navigation label shown in the header.
    pub fn title(&self) -> &'static str {
        match self {
            View::Landing => "首页",
            View::Form => "分享故事",
            View::Wall => "故事墙",
        }
    }

    pub fn parse(s: &str) -> Option<View> {
        match s.trim().to_lowercase().as_str() {
            "landing" | "home" => Some(View::Landing),
            "form" | "share" => Some(View::Form),
            "wall" => Some(View::Wall),
            _ => None,
        }
    }
}

/// Inputs to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    Navigate(View),
    SubmissionSucceeded,
}

/// A completed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: View,
    pub to: View,
}

impl Transition {
    /// True if this transition arrived at `view` from a different view.
    pub fn entered(&self, view: View) -> bool {
        self.to == view && self.from != view
    }

    /// True if this transition left `view` for a different view.
    pub fn left(&self, view: View) -> bool {
        self.from == view && self.to != view
    }
}

/// Router state: the active view and its scroll offset.
#[derive(Debug, Clone, Default)]
pub struct ViewRouter {
    current: View,
    scroll: usize,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Apply an action. Always succeeds and always resets the scroll offset.
    pub fn dispatch(&mut self, action: RouteAction) -> Transition {
        let from = self.current;
        let to = match action {
            RouteAction::Navigate(view) => view,
            // The delayed completion may fire after the user has moved on;
            // it still lands on the wall, as the table's form -> wall row does.
            RouteAction::SubmissionSucceeded => View::Wall,
        };

        self.current = to;
        self.scroll = 0;
        tracing::debug!(from = from.name(), to = to.name(), "view transition");
        Transition { from, to }
    }

    pub fn navigate(&mut self, view: View) -> Transition {
        self.dispatch(RouteAction::Navigate(view))
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Clamp the offset to the rendered content height.
    pub fn clamp_scroll(&mut self, max: usize) {
        self.scroll = self.scroll.min(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_landing() {
        let router = ViewRouter::new();
        assert_eq!(router.current(), View::Landing);
        assert_eq!(router.scroll(), 0);
    }

    #[test]
    fn test_every_view_reachable_from_every_view() {
        for &from in View::all() {
            for &to in View::all() {
                let mut router = ViewRouter::new();
                router.navigate(from);
                let transition = router.navigate(to);
                assert_eq!(transition, Transition { from, to });
                assert_eq!(router.current(), to);
            }
        }
    }

    #[test]
    fn test_submission_lands_on_wall() {
        let mut router = ViewRouter::new();
        router.navigate(View::Form);
        let transition = router.dispatch(RouteAction::SubmissionSucceeded);
        assert_eq!(transition.from, View::Form);
        assert_eq!(transition.to, View::Wall);
        assert!(transition.entered(View::Wall));
        assert!(transition.left(View::Form));
    }

    #[test]
    fn test_transitions_reset_scroll() {
        let mut router = ViewRouter::new();
        router.navigate(View::Wall);
        router.scroll_down(12);
        assert_eq!(router.scroll(), 12);

        router.navigate(View::Landing);
        assert_eq!(router.scroll(), 0);

        router.scroll_down(3);
        router.navigate(View::Landing);
        assert_eq!(router.scroll(), 0);
    }

    #[test]
    fn test_scroll_saturates() {
        let mut router = ViewRouter::new();
        router.scroll_up(5);
        assert_eq!(router.scroll(), 0);
        router.scroll_down(20);
        router.clamp_scroll(8);
        assert_eq!(router.scroll(), 8);
    }

    #[test]
    fn test_parse_view() {
        assert_eq!(View::parse("Wall"), Some(View::Wall));
        assert_eq!(View::parse("home"), Some(View::Landing));
        assert_eq!(View::parse("gallery"), None);
    }
}
