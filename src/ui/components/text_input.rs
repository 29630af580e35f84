use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

const MASK: char = '•';

/// Single-line text field.
///
/// The cursor is a character index, so multi-byte input edits correctly.
/// Secret fields are masked until their visibility is toggled.
pub struct TextInput {
    label: String,
    value: String,
    cursor: usize,
    placeholder: Option<String>,
    secret: bool,
    revealed: bool,
    focused: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            secret: false,
            revealed: false,
            focused: false,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.value.chars().count();
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub const fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Show or hide the value of a secret field. Returns false for plain fields.
    pub const fn toggle_visibility(&mut self) -> bool {
        if self.secret {
            self.revealed = !self.revealed;
        }
        self.secret
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let (start, end) = (self.byte_index(pos), self.byte_index(self.cursor));
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn display_value(&self) -> String {
        if self.secret && !self.revealed {
            MASK.to_string().repeat(self.len())
        } else {
            self.value.clone()
        }
    }
}

impl Component for TextInput {
    type Output = ();

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        match (key.code, key.modifiers) {
            (KeyCode::Backspace, KeyModifiers::ALT) => self.delete_word_before_cursor(),
            (KeyCode::Backspace, _) => self.delete_char_before_cursor(),
            (KeyCode::Delete, _) => self.delete_char_at_cursor(),
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor = (self.cursor + 1).min(self.len()),
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => self.cursor = 0,
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.value.clear();
                self.cursor = 0;
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.insert_char(c),
            _ => return Ok(EventResult::Ignored),
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);

        let line = if self.value.is_empty() {
            let mut spans = Vec::new();
            if self.focused {
                spans.push(Span::styled(" ", cursor_style));
            }
            if let Some(placeholder) = &self.placeholder {
                spans.push(Span::styled(
                    placeholder.clone(),
                    Style::default().fg(theme.overlay0()),
                ));
            }
            Line::from(spans)
        } else if self.focused {
            let display: Vec<char> = self.display_value().chars().collect();
            let before: String = display[..self.cursor].iter().collect();
            let at = display.get(self.cursor).copied().unwrap_or(' ');
            let after: String = display.iter().skip(self.cursor + 1).collect();
            Line::from(vec![
                Span::styled(before, input_style),
                Span::styled(at.to_string(), cursor_style),
                Span::styled(after, input_style),
            ])
        } else {
            Line::from(Span::styled(self.display_value(), input_style))
        };

        let mut title = format!(" {} ", self.label);
        if self.secret {
            title.push_str(if self.revealed { "(shown) " } else { "(hidden) " });
        }
        let border_color = if self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };
        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(if self.focused {
                theme.mauve()
            } else {
                theme.subtext0()
            }))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}
