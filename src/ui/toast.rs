use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use super::{Component, Result};
use crate::Theme;

const TOAST_DURATION: Duration = Duration::from_secs(3);
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Info,
}

#[derive(Debug, Clone)]
pub struct Toast {
    message: String,
    toast_type: ToastType,
    created_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
        }
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= TOAST_DURATION
    }
}

/// Short-lived notifications stacked in the bottom-right corner.
#[derive(Default)]
pub struct ToastManager {
    toasts: VecDeque<Toast>,
}

impl ToastManager {
    pub fn show(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > MAX_VISIBLE {
            self.toasts.pop_front();
        }
    }

    #[cfg(test)]
    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }
}

impl Component for ToastManager {
    type Output = ();

    fn handle_key(&mut self, _key: crossterm::event::KeyEvent) -> Result<super::EventResult<()>> {
        Ok(super::EventResult::Ignored)
    }

    fn handle_tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        const HEIGHT: u16 = 3;
        let width = 50u16.min(area.width.saturating_sub(4));

        // Newest at the bottom
        let mut bottom = area.y + area.height.saturating_sub(1);
        for toast in self.toasts.iter().rev() {
            let Some(y) = bottom.checked_sub(HEIGHT).filter(|y| *y >= area.y) else {
                break;
            };
            let x = area.x + area.width.saturating_sub(width + 2);
            let toast_area = Rect::new(x, y, width, HEIGHT);
            bottom = y.saturating_sub(1);

            let (color, icon) = match toast.toast_type {
                ToastType::Success => (theme.success(), "✓"),
                ToastType::Info => (theme.info(), "ℹ"),
            };

            frame.render_widget(Clear, toast_area);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(theme.surface0()));
            let paragraph = Paragraph::new(format!("{icon} {}", toast.message))
                .style(
                    Style::default()
                        .fg(theme.text())
                        .add_modifier(Modifier::BOLD),
                )
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, toast_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_latest_toasts() {
        let mut manager = ToastManager::default();
        for i in 0..5 {
            manager.show(Toast::new(format!("toast {i}"), ToastType::Info));
        }

        let messages: Vec<_> = manager.toasts().map(Toast::message).collect();
        assert_eq!(messages, vec!["toast 2", "toast 3", "toast 4"]);
    }
}
