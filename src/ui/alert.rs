use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::ui::{Component, EventResult, Result};

pub enum AlertEvent {
    Dismissed,
}

/// Blocking message box with a title, dismissed with a key.
pub struct AlertDialog {
    title: String,
    message: String,
    resolver: Arc<KeyResolver>,
}

impl AlertDialog {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        resolver: Arc<KeyResolver>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            resolver,
        }
    }

    #[cfg(test)]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Component for AlertDialog {
    type Output = AlertEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_dialog(&key, DialogAction::Dismiss) {
            return Ok(AlertEvent::Dismissed.into());
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(50), Constraint::Length(8));
        frame.render_widget(Clear, popup_area);

        let mut lines = vec![Line::from("")];
        if !self.message.is_empty() {
            lines.push(Line::from(Span::styled(
                self.message.as_str(),
                Style::default().fg(theme.text()),
            )));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            format!(
                "Press {} to dismiss",
                self.resolver.display_dialog(DialogAction::Dismiss)
            ),
            Style::default().fg(theme.overlay1()),
        )));

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(theme.error())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.error()))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, popup_area);
    }
}
