//! Color theme and styling for the story wall TUI

use journey_core::Identity;
use ratatui::style::{Color, Modifier, Style};

/// Story wall color theme
#[derive(Debug, Clone)]
pub struct JourneyTheme {
    // Base colors
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,
    pub accent: Color,

    // Identity badge colors
    pub student: Color,
    pub alumni: Color,
    pub faculty: Color,

    // Feedback colors
    pub success: Color,
    pub error: Color,
    pub highlight: Color,
}

impl Default for JourneyTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::LightRed,
            accent: Color::Red,

            student: Color::LightBlue,
            alumni: Color::Yellow,
            faculty: Color::LightRed,

            success: Color::Green,
            error: Color::Red,
            highlight: Color::LightYellow,
        }
    }
}

impl JourneyTheme {
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted).add_modifier(Modifier::DIM)
    }

    pub fn heading_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Badge color for an identity
    pub fn identity_color(&self, identity: Identity) -> Color {
        match identity {
            Identity::Student => self.student,
            Identity::Alumni => self.alumni,
            Identity::Faculty => self.faculty,
        }
    }

    pub fn identity_style(&self, identity: Identity) -> Style {
        Style::default()
            .fg(self.identity_color(identity))
            .add_modifier(Modifier::BOLD)
    }

    /// Style for a navigation or filter option
    pub fn option_style(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(Color::Black)
                .bg(self.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.foreground)
        }
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn title_style(&self, focused: bool) -> Style {
        let style = Style::default().fg(if focused {
            self.border_focused
        } else {
            self.foreground
        });

        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success).add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Style for the character under the input cursor
    pub fn cursor_style(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
    }
}
