//! Story card widget for the wall

use journey_core::form::image_size_hint;
use journey_core::Story;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::JourneyTheme;

/// A single story on the wall
pub struct StoryCardWidget<'a> {
    story: &'a Story,
    theme: &'a JourneyTheme,
}

impl<'a> StoryCardWidget<'a> {
    pub fn new(story: &'a Story, theme: &'a JourneyTheme) -> Self {
        Self { story, theme }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let story = self.story;
        let mut lines = Vec::new();

        if let Some(image) = &story.image {
            let kib = image_size_hint(image).div_ceil(1024);
            lines.push(Line::from(Span::styled(
                format!("[照片 {kib} KB]"),
                self.theme.muted_style(),
            )));
        }

        let mut badges = vec![Span::styled(
            format!(" {} ", story.identity.label()),
            self.theme.identity_style(story.identity),
        )];
        if !story.graduation_year.trim().is_empty() {
            badges.push(Span::raw(" "));
            badges.push(Span::styled(
                format!("{}届", story.graduation_year),
                self.theme.text_style(),
            ));
        }
        badges.push(Span::styled(
            format!("  {}", story.date.format("%Y-%m-%d")),
            self.theme.muted_style(),
        ));
        lines.push(Line::from(badges));

        lines.push(Line::from(Span::styled(
            story.college.as_str(),
            self.theme.muted_style(),
        )));
        lines.push(Line::from(vec![
            Span::styled("To: ", self.theme.muted_style()),
            Span::styled(
                story.target_person.as_str(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));

        for paragraph in story.content.split('\n') {
            lines.push(Line::from(paragraph.to_string()));
        }

        lines.push(Line::from(Span::styled(
            format!("From: {}", story.author),
            self.theme.muted_style().add_modifier(Modifier::ITALIC),
        )));
        lines
    }

    /// Rows needed to show the whole card at `width` columns
    pub fn height(&self, width: u16) -> u16 {
        let inner = usize::from(width.saturating_sub(2)).max(1);
        let rows: usize = self
            .lines()
            .iter()
            .map(|line| line.width().div_ceil(inner).max(1))
            .sum();
        u16::try_from(rows + 2).unwrap_or(u16::MAX)
    }
}

impl Widget for StoryCardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.identity_color(self.story.identity)));

        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
