//! Story submission form screen.
//!
//! A single-page form: focus moves between fields with Tab, text fields
//! are edited in place and the identity is picked from a fixed list.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use journey_core::form::image_size_hint;
use journey_core::{Draft, FormError, FormField, Identity, StoryForm};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::theme::JourneyTheme;
use crate::ui::widgets::InputWidget;

/// Focusable parts of the form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Identity,
    GraduationYear,
    College,
    TargetPerson,
    Content,
    Image,
    Author,
    Submit,
}

impl FormFocus {
    pub fn all() -> &'static [FormFocus] {
        &[
            FormFocus::Identity,
            FormFocus::GraduationYear,
            FormFocus::College,
            FormFocus::TargetPerson,
            FormFocus::Content,
            FormFocus::Image,
            FormFocus::Author,
            FormFocus::Submit,
        ]
    }

    fn index(&self) -> usize {
        Self::all().iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> FormFocus {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn prev(&self) -> FormFocus {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormFocus::Identity => "我在广东外语外贸大学的身份是：",
            FormFocus::GraduationYear => "毕业年份 / 入学年份：",
            FormFocus::College => "我所在的学院/单位（请填写准确名称）：",
            FormFocus::TargetPerson => "故事的主角是（请填写老师或学生的准确姓名）：",
            FormFocus::Content => "分享您与这位老师/学生这段旅程中的温暖故事：",
            FormFocus::Image => "添加照片 (可选)：",
            FormFocus::Author => "您的署名：",
            FormFocus::Submit => "提交",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FormFocus::Identity => "请选择身份",
            FormFocus::GraduationYear => "例如：2018 / 2024",
            FormFocus::College => "例如：新闻与传播学院 / 国际关系学院 / 国际商务英语学院",
            FormFocus::TargetPerson => "例如：XX老师 / XX同学",
            FormFocus::Content => "请分享让您感动、被启发或共同经历的难忘瞬间...",
            FormFocus::Image => "输入图片文件路径，按 Enter 上传",
            FormFocus::Author => "您的姓名、昵称或填写 '广东外语外贸大学某校友'",
            FormFocus::Submit => "",
        }
    }

    pub fn required(&self) -> bool {
        matches!(
            self,
            FormFocus::Identity
                | FormFocus::GraduationYear
                | FormFocus::College
                | FormFocus::TargetPerson
                | FormFocus::Content
        )
    }

    /// Rows the section occupies on screen.
    fn height(&self) -> u16 {
        match self {
            FormFocus::TargetPerson | FormFocus::Image => 4,
            FormFocus::Content => 7,
            FormFocus::Submit => 4,
            _ => 3,
        }
    }
}

impl From<FormField> for FormFocus {
    fn from(field: FormField) -> Self {
        match field {
            FormField::GraduationYear => FormFocus::GraduationYear,
            FormField::College => FormFocus::College,
            FormField::TargetPerson => FormFocus::TargetPerson,
            FormField::Content => FormFocus::Content,
        }
    }
}

/// What the form asks its owner to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCommand {
    None,
    Submit,
    Leave,
}

/// Submission form state.
#[derive(Debug, Clone)]
pub struct SubmissionForm {
    pub fields: StoryForm,
    pub focus: FormFocus,
    /// Character index within the focused text field
    cursor_position: usize,
    /// Path typed into the photo field
    image_path: String,
    /// True between pressing submit and the story being stored
    pub submitting: bool,
    error: Option<String>,
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionForm {
    pub fn new() -> Self {
        Self {
            fields: StoryForm::new(),
            focus: FormFocus::Identity,
            cursor_position: 0,
            image_path: String::new(),
            submitting: false,
            error: None,
        }
    }

    /// Discard everything typed so far.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Validate the fields, moving focus to the first problem on failure.
    pub fn validate(&mut self) -> Result<Draft, FormError> {
        self.fields.validate().inspect_err(|e| {
            match e {
                FormError::MissingIdentity => self.set_focus(FormFocus::Identity),
                FormError::MissingField(field) => self.set_focus((*field).into()),
                _ => {}
            }
            self.error = Some(e.to_string());
        })
    }

    /// Mark the form as submitted and waiting.
    pub fn begin_submit(&mut self) {
        self.submitting = true;
        self.error = None;
    }

    // =========================================================================
    // Key handling
    // =========================================================================

    pub fn handle_key(&mut self, key: KeyEvent) -> FormCommand {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return FormCommand::Leave,
            KeyCode::Char('s') if ctrl => return FormCommand::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.set_focus(self.focus.next());
                return FormCommand::None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.set_focus(self.focus.prev());
                return FormCommand::None;
            }
            _ => {}
        }

        // The form is read-only while a submission is pending
        if self.submitting {
            return FormCommand::None;
        }

        match self.focus {
            FormFocus::Identity => self.handle_identity_key(key),
            FormFocus::Submit => {
                if key.code == KeyCode::Enter {
                    return FormCommand::Submit;
                }
            }
            FormFocus::Image => match key.code {
                KeyCode::Enter => self.attach_image(),
                KeyCode::Char('x') if ctrl => self.remove_image(),
                _ => self.handle_text_key(key),
            },
            FormFocus::Content => match key.code {
                KeyCode::Enter => self.type_char('\n'),
                _ => self.handle_text_key(key),
            },
            _ => match key.code {
                KeyCode::Enter => self.set_focus(self.focus.next()),
                _ => self.handle_text_key(key),
            },
        }
        FormCommand::None
    }

    fn handle_identity_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('l') => self.cycle_identity(true),
            KeyCode::Left | KeyCode::Char('h') => self.cycle_identity(false),
            KeyCode::Char(c @ '1'..='3') => {
                let index = usize::from(c as u8 - b'1');
                self.fields.identity = Identity::all().get(index).copied();
            }
            KeyCode::Enter => self.set_focus(self.focus.next()),
            _ => {}
        }
    }

    fn handle_text_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }
        match key.code {
            KeyCode::Char(c) => self.type_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor_left(),
            KeyCode::Right => self.cursor_right(),
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_end(),
            _ => {}
        }
    }

    pub fn cycle_identity(&mut self, forward: bool) {
        let all = Identity::all();
        let next = match self.fields.identity {
            None if forward => 0,
            None => all.len() - 1,
            Some(current) => {
                let index = all.iter().position(|i| *i == current).unwrap_or(0);
                if forward {
                    (index + 1) % all.len()
                } else {
                    (index + all.len() - 1) % all.len()
                }
            }
        };
        self.fields.identity = Some(all[next]);
    }

    pub fn set_focus(&mut self, focus: FormFocus) {
        self.focus = focus;
        self.cursor_end();
    }

    // =========================================================================
    // Photo
    // =========================================================================

    /// Load the file named in the photo field.
    pub fn attach_image(&mut self) {
        let path = self.image_path.trim().to_string();
        if path.is_empty() {
            return;
        }
        match self.fields.attach_image(&path) {
            Ok(()) => {
                tracing::debug!(path = %path, "attached photo");
                self.image_path.clear();
                self.cursor_position = 0;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "could not attach photo");
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn remove_image(&mut self) {
        self.fields.remove_image();
    }

    // =========================================================================
    // Text editing (unicode-safe)
    // =========================================================================

    fn buffer(&self) -> Option<&str> {
        match self.focus {
            FormFocus::GraduationYear => Some(&self.fields.graduation_year),
            FormFocus::College => Some(&self.fields.college),
            FormFocus::TargetPerson => Some(&self.fields.target_person),
            FormFocus::Content => Some(&self.fields.content),
            FormFocus::Image => Some(&self.image_path),
            FormFocus::Author => Some(&self.fields.author),
            FormFocus::Identity | FormFocus::Submit => None,
        }
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormFocus::GraduationYear => Some(&mut self.fields.graduation_year),
            FormFocus::College => Some(&mut self.fields.college),
            FormFocus::TargetPerson => Some(&mut self.fields.target_person),
            FormFocus::Content => Some(&mut self.fields.content),
            FormFocus::Image => Some(&mut self.image_path),
            FormFocus::Author => Some(&mut self.fields.author),
            FormFocus::Identity | FormFocus::Submit => None,
        }
    }

    fn char_count(&self) -> usize {
        self.buffer().map(|b| b.chars().count()).unwrap_or(0)
    }

    pub fn type_char(&mut self, c: char) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.buffer_mut() {
            let byte_pos = buffer
                .char_indices()
                .nth(cursor)
                .map(|(i, _)| i)
                .unwrap_or(buffer.len());
            buffer.insert(byte_pos, c);
            self.cursor_position += 1;
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let cursor = self.cursor_position - 1;
        if let Some(buffer) = self.buffer_mut() {
            if let Some((byte_pos, ch)) = buffer.char_indices().nth(cursor) {
                buffer.replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
            self.cursor_position = cursor;
        }
    }

    pub fn delete(&mut self) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.buffer_mut() {
            if let Some((byte_pos, ch)) = buffer.char_indices().nth(cursor) {
                buffer.replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor_position = (self.cursor_position + 1).min(self.char_count());
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.char_count();
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &JourneyTheme) {
        let width = area.width.min(84);
        let area = Rect {
            x: area.x + (area.width - width) / 2,
            width,
            ..area
        };

        const HEADER_HEIGHT: u16 = 3;
        let sections = FormFocus::all();

        // Scroll just far enough to keep the focused section on screen
        let mut focus_bottom = HEADER_HEIGHT;
        for section in sections {
            focus_bottom += section.height();
            if *section == self.focus {
                break;
            }
        }
        let offset = focus_bottom.saturating_sub(area.height);

        let mut top = 0u16;
        let header = std::iter::once((None, HEADER_HEIGHT));
        let fields = sections.iter().map(|s| (Some(*s), s.height()));
        for (section, height) in header.chain(fields) {
            let visible = top >= offset && top - offset + height <= area.height;
            if visible {
                let rect = Rect {
                    y: area.y + top - offset,
                    height,
                    ..area
                };
                match section {
                    None => self.render_header(frame, rect, theme),
                    Some(focus) => self.render_section(frame, rect, focus, theme),
                }
            }
            top += height;
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, theme: &JourneyTheme) {
        let lines = vec![
            Line::from(Span::styled("分享您的师生故事", theme.heading_style())),
            Line::from(Span::styled("每一个被记录的瞬间，都是永恒的温暖", theme.muted_style())),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    fn render_section(&self, frame: &mut Frame, area: Rect, focus: FormFocus, theme: &JourneyTheme) {
        let active = self.focus == focus;
        match focus {
            FormFocus::Identity => self.render_identity(frame, area, active, theme),
            FormFocus::Submit => self.render_submit(frame, area, active, theme),
            FormFocus::TargetPerson | FormFocus::Image => {
                let [field, hint] =
                    Layout::vertical([Constraint::Length(3), Constraint::Length(1)]).areas(area);
                self.render_text_field(frame, field, focus, active, theme);
                let hint_line = if focus == FormFocus::TargetPerson {
                    Line::from(Span::styled(
                        "请确保填写真实姓名，以便让Ta看到这份温暖。",
                        theme.muted_style(),
                    ))
                } else {
                    self.image_hint(theme)
                };
                frame.render_widget(Paragraph::new(hint_line), hint);
            }
            _ => self.render_text_field(frame, area, focus, active, theme),
        }
    }

    fn render_text_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        focus: FormFocus,
        active: bool,
        theme: &JourneyTheme,
    ) {
        let content: &str = match focus {
            FormFocus::GraduationYear => &self.fields.graduation_year,
            FormFocus::College => &self.fields.college,
            FormFocus::TargetPerson => &self.fields.target_person,
            FormFocus::Content => &self.fields.content,
            FormFocus::Image => &self.image_path,
            FormFocus::Author => &self.fields.author,
            FormFocus::Identity | FormFocus::Submit => "",
        };
        let widget = InputWidget::new(content, theme)
            .label(focus.label())
            .placeholder(focus.placeholder())
            .required(focus.required())
            .cursor_position(if active { self.cursor_position() } else { 0 })
            .active(active)
            .disabled(self.submitting);
        frame.render_widget(widget, area);
    }

    fn render_identity(&self, frame: &mut Frame, area: Rect, active: bool, theme: &JourneyTheme) {
        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(
                    format!(" {} ", FormFocus::Identity.label()),
                    theme.title_style(active),
                ),
                Span::styled("* ", theme.error_style()),
            ]))
            .borders(Borders::ALL)
            .border_style(theme.border_style(active));

        let mut spans = Vec::new();
        if self.fields.identity.is_none() {
            spans.push(Span::styled(
                format!("{}  ", FormFocus::Identity.placeholder()),
                theme.muted_style(),
            ));
        }
        for (i, identity) in Identity::all().iter().enumerate() {
            let selected = self.fields.identity == Some(*identity);
            spans.push(Span::styled(
                format!(" {} {} ", i + 1, identity.form_label()),
                theme.option_style(selected),
            ));
            spans.push(Span::raw(" "));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn image_hint(&self, theme: &JourneyTheme) -> Line<'static> {
        match &self.fields.image {
            Some(image) => Line::from(vec![
                Span::styled(
                    format!("已添加照片 ({} KB)", image_size_hint(image).div_ceil(1024)),
                    theme.success_style(),
                ),
                Span::styled("  Ctrl+X 移除", theme.muted_style()),
            ]),
            None => Line::from(Span::styled(
                "一张合影，或是一张有纪念意义的老照片。",
                theme.muted_style(),
            )),
        }
    }

    fn render_submit(&self, frame: &mut Frame, area: Rect, active: bool, theme: &JourneyTheme) {
        let [button, error] =
            Layout::vertical([Constraint::Length(3), Constraint::Length(1)]).areas(area);

        let (label, style) = if self.submitting {
            ("提交中...", theme.muted_style())
        } else {
            ("提交故事，汇入共同的旅程 (Ctrl+S)", theme.option_style(active))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(active && !self.submitting));
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(label, style)))
                .alignment(Alignment::Center)
                .block(block),
            button,
        );

        if let Some(message) = self.error() {
            frame.render_widget(
                Paragraph::new(Span::styled(message, theme.error_style())),
                error,
            );
        }
    }
}
