use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};
use crate::ui::{Component, Spinner};

const LOGO: &[&str] = &[
    r"  ___________  ",
    r" |  _  _  _  | ",
    r" | |_||_||_| | ",
    r" |___________| ",
    r"    lazybook   ",
];

/// Height of the status bar including its border.
pub const STATUS_BAR_HEIGHT: u16 = 7;

/// A key hint shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    pub key: String,
    pub description: String,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// What the status bar shows for the current frame.
pub struct StatusLine<'a> {
    pub breadcrumbs: &'a [String],
    pub running: &'a [String],
    pub keybindings: &'a [Keybinding],
}

pub struct StatusBar {
    resolver: Arc<KeyResolver>,
    spinner: Spinner,
}

impl StatusBar {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            resolver,
            spinner: Spinner::default(),
        }
    }

    pub fn handle_tick(&mut self) {
        self.spinner.handle_tick();
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, status: &StatusLine) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [left, middle, right] = Layout::horizontal([
            Constraint::Length(36),
            Constraint::Min(20),
            Constraint::Length(16),
        ])
        .areas(inner);

        self.render_status(frame, left, theme, status);
        self.render_keybindings(frame, middle, theme, status.keybindings);
        Self::render_logo(frame, right, theme);
    }

    fn render_status(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, status: &StatusLine) {
        let width = area.width as usize;
        let mut lines = vec![Line::from(Span::styled(
            truncate_str(&status.breadcrumbs.join(" › "), width),
            Style::default()
                .fg(theme.lavender())
                .add_modifier(Modifier::BOLD),
        ))];

        if status.running.is_empty() {
            frame.render_widget(Paragraph::new(lines), area);
            return;
        }

        lines.push(Line::from(""));
        lines.extend(status.running.iter().map(|name| {
            Line::from(Span::styled(
                format!("  {}", truncate_str(name, width.saturating_sub(2))),
                Style::default().fg(theme.subtext0()),
            ))
        }));
        frame.render_widget(Paragraph::new(lines), area);

        // Spinner in front of the first running command
        if area.height > 2 {
            let spinner_area = Rect::new(area.x, area.y + 2, 1, 1);
            self.spinner.render_inline(frame, spinner_area, theme);
        }
    }

    fn render_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        let global = self.global_keybindings();
        let hints: Vec<&Keybinding> = local_keybindings.iter().chain(global.iter()).collect();

        let key_width = hints.iter().map(|kb| kb.key.chars().count()).max().unwrap_or(1);
        let desc_width = hints
            .iter()
            .map(|kb| kb.description.chars().count())
            .max()
            .unwrap_or(1);
        let col_width = u16::try_from(key_width + 3 + desc_width + 2).unwrap_or(u16::MAX);
        let num_cols = (area.width / col_width).max(1) as usize;
        let num_rows = (area.height as usize).max(1);

        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];
        for (i, kb) in hints.iter().enumerate() {
            let Some(column) = columns.get_mut(i / num_rows) else {
                break;
            };
            column.push(Line::from(vec![
                Span::styled(
                    format!("{:>key_width$}", kb.key),
                    Style::default().fg(theme.peach()),
                ),
                Span::styled(" │ ", Style::default().fg(theme.overlay0())),
                Span::styled(kb.description.clone(), Style::default().fg(theme.subtext0())),
            ]));
        }

        let col_areas = Layout::horizontal(vec![Constraint::Length(col_width); num_cols]).split(area);
        for (lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
            frame.render_widget(Paragraph::new(lines), *col_area);
        }
    }

    fn render_logo(frame: &mut Frame, area: Rect, theme: &Theme) {
        let style = Style::default()
            .fg(theme.mauve())
            .add_modifier(Modifier::BOLD);
        let lines: Vec<Line> = LOGO
            .iter()
            .map(|line| Line::from(Span::styled(*line, style)))
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_global(GlobalAction::Back), "Back"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Theme), "Theme"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Quit), "Quit"),
        ]
    }
}

/// Truncate to `max_width` characters, ending with "..." when cut.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_width).collect()
    }
}
