//! Screen layout calculations

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Areas of the main screen
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub header: Rect,
    pub content: Rect,
    pub footer: Rect,
    pub hotkey_bar: Rect,
}

impl AppLayout {
    pub fn calculate(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(5),    // content
                Constraint::Length(3), // footer
                Constraint::Length(1), // hotkeys
            ])
            .split(area);

        Self {
            header: chunks[0],
            content: chunks[1],
            footer: chunks[2],
            hotkey_bar: chunks[3],
        }
    }
}

/// A rectangle of at most `width` x `height` centered in `area`
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// A `width` x `height` rectangle in the top-right corner of `area`
pub fn top_right_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height,
    }
}
