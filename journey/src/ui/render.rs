//! Render orchestration for the story wall TUI

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use journey_core::wall::{EMPTY_WALL_HINT, EMPTY_WALL_TITLE};
use journey_core::{CollegeFilter, Identity, IdentityFilter, Story, View};

use crate::app::{App, Toast};
use crate::ui::layout::{centered_rect_fixed, top_right_rect, AppLayout};
use crate::ui::widgets::StoryCardWidget;

/// Overlay types
#[derive(Debug, Clone)]
pub enum Overlay {
    Help,
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::calculate(area);

    render_header(frame, app, layout.header);

    match app.view() {
        View::Landing => render_landing(frame, app, layout.content),
        View::Form => app.form.render(frame, layout.content, &app.theme),
        View::Wall => render_wall(frame, app, layout.content),
    }

    render_footer(frame, app, layout.footer);
    render_hotkey_bar(frame, app, layout.hotkey_bar);

    if let Some(toast) = app.toast() {
        render_toast(frame, app, toast, layout.content);
    }

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

/// Render the header: brand on the left, navigation on the right
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let brand = Line::from(Span::styled(" 广外：共同的旅程", app.theme.heading_style()));
    frame.render_widget(Paragraph::new(brand), area);

    // The home link only appears away from the landing page
    let mut spans = Vec::new();
    if view != View::Landing {
        spans.push(Span::styled(
            format!(" F2 {} ", View::Landing.title()),
            app.theme.option_style(false),
        ));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        format!(" F4 {} ", View::Wall.title()),
        app.theme.option_style(view == View::Wall),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!(" F3 {} ", View::Form.title()),
        app.theme.option_style(view == View::Form),
    ));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
        area,
    );
}

/// Render the landing page
fn render_landing(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "广东外语外贸大学：共同的旅程",
            theme.heading_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "记录师生情谊的温暖瞬间",
            theme.text_style().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "每一位老师都是引路人，每一位学生都是传承者。",
            theme.text_style(),
        )),
        Line::from(Span::styled(
            "在这里，让我们写下彼此生命中交织的感动，汇聚成广外人共同的记忆。",
            theme.text_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [s] 分享我的师生故事 ", theme.option_style(true)),
            Span::raw("    "),
            Span::styled(" [w] 查看师生故事墙 ", theme.option_style(false)),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled("58+", theme.heading_style()),
            Span::styled(" 年建校历史      ", theme.muted_style()),
            Span::styled("1000+", theme.heading_style()),
            Span::styled(" 温暖故事      ", theme.muted_style()),
            Span::styled("∞", theme.heading_style()),
            Span::styled(" 师生情谊", theme.muted_style()),
        ]),
    ];

    let scroll = u16::try_from(app.session.router().scroll()).unwrap_or(u16::MAX);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .scroll((scroll, 0)),
        area,
    );
}

/// Render the story wall: heading, filters and cards
fn render_wall(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let session = &app.session;
    let stories = session.stories();

    let heading = vec![
        Line::from(Span::styled("共同的旅程 · 故事墙", theme.heading_style())),
        Line::from(Span::styled(
            format!("汇聚 {} 个温暖瞬间", stories.len()),
            theme.muted_style(),
        )),
        filter_line(app),
    ];
    let heading_height = heading.len() as u16 + 1;
    let [heading_area, cards_area] =
        Layout::vertical([Constraint::Length(heading_height), Constraint::Min(0)]).areas(area);
    frame.render_widget(Paragraph::new(heading), heading_area);

    let visible = session.visible_stories();
    if visible.is_empty() {
        let empty = vec![
            Line::from(""),
            Line::from(Span::styled(EMPTY_WALL_TITLE, theme.text_style())),
            Line::from(Span::styled(EMPTY_WALL_HINT, theme.muted_style())),
        ];
        frame.render_widget(
            Paragraph::new(empty).alignment(Alignment::Center),
            cards_area,
        );
        return;
    }

    render_cards(frame, app, &visible, cards_area);
}

/// Filter chips for identity and the selected college
fn filter_line(app: &App) -> Line<'static> {
    let theme = &app.theme;
    let filter = app.session.filter();

    let mut spans = vec![Span::styled("筛选: ", theme.muted_style())];
    let options = std::iter::once(("a", IdentityFilter::All)).chain(
        Identity::all()
            .iter()
            .zip(["1", "2", "3"])
            .map(|(identity, key)| (key, IdentityFilter::Only(*identity))),
    );
    for (key, option) in options {
        spans.push(Span::styled(
            format!(" {key} {} ", option.label()),
            theme.option_style(filter.identity == option),
        ));
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled("  c ", theme.muted_style()));
    let college_style = if filter.college == CollegeFilter::Any {
        theme.text_style()
    } else {
        theme.option_style(true)
    };
    spans.push(Span::styled(
        format!("[{} ▾]", filter.college.label()),
        college_style,
    ));
    Line::from(spans)
}

/// Stack cards top to bottom starting at the scroll offset
fn render_cards(frame: &mut Frame, app: &App, stories: &[Story], area: Rect) {
    let offset = app.session.router().scroll().min(stories.len().saturating_sub(1));
    let mut y = area.y;
    let bottom = area.y + area.height;

    for story in &stories[offset..] {
        let card = StoryCardWidget::new(story, &app.theme);
        let height = card.height(area.width);
        if y >= bottom {
            break;
        }
        // Let the last card be cut off rather than leaving a gap
        let rect = Rect {
            x: area.x,
            y,
            width: area.width,
            height: height.min(bottom - y),
        };
        frame.render_widget(card, rect);
        y = y.saturating_add(height);
    }

    if offset > 0 || y > bottom {
        let position = format!(" {}/{} ", offset + 1, stories.len());
        let width = position.chars().count() as u16;
        if area.width > width && area.height > 0 {
            let rect = Rect {
                x: area.x + area.width - width - 1,
                y: bottom - 1,
                width,
                height: 1,
            };
            frame.render_widget(
                Paragraph::new(Span::styled(position, app.theme.muted_style())),
                rect,
            );
        }
    }
}

/// Render the footer with the live story counter and status message
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled("广东外语外贸大学：共同的旅程", theme.text_style().add_modifier(Modifier::BOLD)),
        Span::raw("  ·  已汇聚 "),
        Span::styled(app.story_count().to_string(), theme.heading_style()),
        Span::raw(" 个师生温暖瞬间"),
    ];
    if let Some(status) = app.status_message() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(status.to_string(), theme.error_style()));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(false));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Render the hotkey bar for the current view
fn render_hotkey_bar(frame: &mut Frame, app: &App, area: Rect) {
    let keys: &[(&str, &str)] = match app.view() {
        View::Landing => &[("s", "分享故事"), ("w", "故事墙"), ("F1", "帮助"), ("q", "退出")],
        View::Form => &[
            ("Tab", "下一项"),
            ("1-3", "身份"),
            ("Ctrl+S", "提交"),
            ("Esc", "返回"),
            ("F1", "帮助"),
        ],
        View::Wall => &[
            ("a/1-3", "身份"),
            ("c/C", "学院"),
            ("r", "清除筛选"),
            ("j/k", "滚动"),
            ("s", "分享"),
            ("q", "退出"),
        ],
    };

    let mut spans = Vec::new();
    for (key, action) in keys {
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default().add_modifier(Modifier::REVERSED),
        ));
        spans.push(Span::styled(format!(" {action}  "), app.theme.muted_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the success toast in the top-right corner
fn render_toast(frame: &mut Frame, app: &App, toast: &Toast, area: Rect) {
    let rect = top_right_rect(34, 4, area);
    frame.render_widget(Clear, rect);

    let lines = vec![
        Line::from(Span::styled(toast.title.clone(), app.theme.success_style())),
        Line::from(toast.detail.clone()),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.success));
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

/// Render overlay
fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, app, area),
    }
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(54, 24, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::UNDERLINED),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            " 共同的旅程 - 帮助 ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Navigation:"),
        Line::from("  F2        首页 (landing)"),
        Line::from("  F3        分享故事 (form)"),
        Line::from("  F4        故事墙 (wall)"),
        Line::from("  Ctrl+C    Quit"),
        Line::from(""),
        section("Form:"),
        Line::from("  Tab/↑/↓   Move between fields"),
        Line::from("  1-3 ←/→   Choose identity"),
        Line::from("  Enter     Next field / new line / attach photo"),
        Line::from("  Ctrl+X    Remove photo"),
        Line::from("  Ctrl+S    Submit"),
        Line::from(""),
        section("Wall:"),
        Line::from("  a / 1-3   All / student / alumni / faculty"),
        Line::from("  c / C     Next / previous college"),
        Line::from("  r         Clear filters"),
        Line::from("  j/k g     Scroll, back to top"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use journey_core::testing::{memory_session, sample_draft};
    use ratatui::{backend::TestBackend, Terminal};

    /// Screen contents with blanks removed, since wide characters leave a
    /// blank cell behind them.
    fn screen(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text.replace(' ', "")
    }

    #[test]
    fn test_landing_renders_calls_to_action() {
        let (session, _) = memory_session();
        let app = App::new(session);
        let text = screen(&app);
        assert!(text.contains("分享我的师生故事"));
        assert!(text.contains("查看师生故事墙"));
        assert!(text.contains("已汇聚"));
    }

    #[test]
    fn test_empty_wall_message() {
        let (session, _) = memory_session();
        let mut app = App::new(session);
        app.navigate(View::Wall);
        let text = screen(&app);
        assert!(text.contains("暂无符合条件的故事。"));
    }

    #[test]
    fn test_wall_shows_cards() {
        let (mut session, _) = memory_session();
        session.submit(sample_draft(Identity::Faculty, "国际关系学院"));
        let app = App::new(session);
        let text = screen(&app);
        assert!(text.contains("国际关系学院"));
        assert!(text.contains("From:"));
        assert!(!text.contains("暂无符合条件的故事。"));
    }

    #[test]
    fn test_form_and_help_render() {
        let (session, _) = memory_session();
        let mut app = App::new(session);
        app.navigate(View::Form);
        assert!(screen(&app).contains("分享您的师生故事"));

        app.toggle_help();
        assert!(screen(&app).contains("Help"));
    }
}
