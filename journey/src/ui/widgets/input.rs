//! Text field widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::JourneyTheme;

/// Bordered text field with a label, placeholder and cursor
pub struct InputWidget<'a> {
    content: &'a str,
    cursor_position: usize,
    theme: &'a JourneyTheme,
    label: &'a str,
    placeholder: &'a str,
    required: bool,
    is_active: bool,
    disabled: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a JourneyTheme) -> Self {
        Self {
            content,
            cursor_position: content.chars().count(),
            theme,
            label: "",
            placeholder: "",
            required: false,
            is_active: false,
            disabled: false,
        }
    }

    pub fn cursor_position(mut self, pos: usize) -> Self {
        self.cursor_position = pos;
        self
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn title(&self) -> Line<'a> {
        let mut spans = vec![Span::styled(
            format!(" {} ", self.label),
            self.theme.title_style(self.is_active),
        )];
        if self.required {
            spans.push(Span::styled("* ", self.theme.error_style()));
        }
        Line::from(spans)
    }

    /// Content lines with the cursor cell highlighted.
    fn lines_with_cursor(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        let mut offset = 0;
        for raw in self.content.split('\n') {
            let len = raw.chars().count();
            // The cursor sits on this line if it falls within it or just past its end
            if self.cursor_position >= offset && self.cursor_position <= offset + len {
                let at = self.cursor_position - offset;
                let before: String = raw.chars().take(at).collect();
                let cursor = raw
                    .chars()
                    .nth(at)
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| " ".to_string());
                let after: String = raw.chars().skip(at + 1).collect();
                lines.push(Line::from(vec![
                    Span::raw(before),
                    Span::styled(cursor, self.theme.cursor_style()),
                    Span::raw(after),
                ]));
            } else {
                lines.push(Line::from(raw.to_string()));
            }
            // Account for the newline separator
            offset += len + 1;
        }
        lines
    }

    /// Row the cursor lands on once the content is wrapped to `width` cells.
    fn cursor_row(&self, width: u16) -> u16 {
        let width = usize::from(width.max(1));
        let mut row = 0;
        let mut offset = 0;
        for raw in self.content.split('\n') {
            let len = raw.chars().count();
            if self.cursor_position <= offset + len {
                let before: String = raw.chars().take(self.cursor_position - offset).collect();
                row += Span::raw(before).width() / width;
                break;
            }
            row += Line::from(raw).width().div_ceil(width).max(1);
            offset += len + 1;
        }
        u16::try_from(row).unwrap_or(u16::MAX)
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.is_active));

        let inner = block.inner(area);
        block.render(area, buf);

        let editing = self.is_active && !self.disabled;
        // Keep the cursor row inside the field
        let scroll = if editing {
            self.cursor_row(inner.width)
                .saturating_sub(inner.height.saturating_sub(1))
        } else {
            0
        };

        let lines = if self.content.is_empty() && !self.is_active {
            vec![Line::from(Span::styled(
                self.placeholder,
                Style::default().add_modifier(Modifier::DIM),
            ))]
        } else if editing {
            self.lines_with_cursor()
        } else {
            self.content.split('\n').map(|l| Line::from(l.to_string())).collect()
        };

        let style = if self.disabled {
            self.theme.muted_style()
        } else {
            self.theme.text_style()
        };

        Paragraph::new(lines)
            .style(style)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(inner, buf);
    }
}
