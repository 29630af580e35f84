use std::sync::Arc;

use catppuccin::PALETTE;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, ListItem};

use crate::config::{GlobalAction, KeyResolver};
use crate::ui::{Component, EventResult, List, ListEvent, ListRow, Result};

fn rgb(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors used by the UI.
///
/// Pages use the semantic accessors (`border`, `header`, `error`, ...) rather
/// than raw palette entries wherever one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub base: Color,
    pub surface0: Color,
    pub surface1: Color,
    pub overlay0: Color,
    pub overlay1: Color,
    pub text: Color,
    pub subtext0: Color,
    pub mauve: Color,
    pub red: Color,
    pub peach: Color,
    pub yellow: Color,
    pub green: Color,
    pub sky: Color,
    pub blue: Color,
    pub lavender: Color,
}

impl Theme {
    fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: rgb(&c.base),
            surface0: rgb(&c.surface0),
            surface1: rgb(&c.surface1),
            overlay0: rgb(&c.overlay0),
            overlay1: rgb(&c.overlay1),
            text: rgb(&c.text),
            subtext0: rgb(&c.subtext0),
            mauve: rgb(&c.mauve),
            red: rgb(&c.red),
            peach: rgb(&c.peach),
            yellow: rgb(&c.yellow),
            green: rgb(&c.green),
            sky: rgb(&c.sky),
            blue: rgb(&c.blue),
            lavender: rgb(&c.lavender),
        }
    }

    #[must_use]
    pub const fn base(&self) -> Color {
        self.base
    }

    #[must_use]
    pub const fn surface0(&self) -> Color {
        self.surface0
    }

    #[must_use]
    pub const fn overlay0(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub const fn overlay1(&self) -> Color {
        self.overlay1
    }

    #[must_use]
    pub const fn text(&self) -> Color {
        self.text
    }

    #[must_use]
    pub const fn subtext0(&self) -> Color {
        self.subtext0
    }

    #[must_use]
    pub const fn mauve(&self) -> Color {
        self.mauve
    }

    #[must_use]
    pub const fn peach(&self) -> Color {
        self.peach
    }

    #[must_use]
    pub const fn yellow(&self) -> Color {
        self.yellow
    }

    #[must_use]
    pub const fn green(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn lavender(&self) -> Color {
        self.lavender
    }

    #[must_use]
    pub const fn primary(&self) -> Color {
        self.blue
    }

    #[must_use]
    pub const fn success(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn warning(&self) -> Color {
        self.yellow
    }

    #[must_use]
    pub const fn error(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn info(&self) -> Color {
        self.sky
    }

    #[must_use]
    pub const fn border(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn border_focused(&self) -> Color {
        self.lavender
    }

    #[must_use]
    pub const fn selection_bg(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn header(&self) -> Color {
        self.yellow
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }
}

/// A named built-in theme.
#[derive(Debug, Clone, Copy)]
pub struct ThemeInfo {
    pub name: &'static str,
    pub theme: Theme,
}

impl ListRow for ThemeInfo {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        ListItem::new(self.name).style(Style::default().fg(theme.text()))
    }
}

pub fn available_themes() -> Vec<ThemeInfo> {
    [
        ("Catppuccin Mocha", &PALETTE.mocha),
        ("Catppuccin Macchiato", &PALETTE.macchiato),
        ("Catppuccin Frappé", &PALETTE.frappe),
        ("Catppuccin Latte", &PALETTE.latte),
    ]
    .into_iter()
    .map(|(name, flavor)| ThemeInfo {
        name,
        theme: Theme::from_catppuccin(flavor),
    })
    .collect()
}

/// Look up a theme by name, falling back to the default theme.
pub fn theme_from_name(name: &str) -> Theme {
    available_themes()
        .into_iter()
        .find(|t| t.name == name)
        .map(|t| t.theme)
        .unwrap_or_default()
}

pub enum ThemeEvent {
    Cancelled,
    Selected(ThemeInfo),
}

/// Popup list for switching themes.
pub struct ThemeSelector {
    list: List<ThemeInfo>,
    resolver: Arc<KeyResolver>,
}

impl ThemeSelector {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            list: List::new(available_themes(), resolver.clone()),
            resolver,
        }
    }
}

impl Component for ThemeSelector {
    type Output = ThemeEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_global(&key, GlobalAction::Back)
            || self.resolver.matches_global(&key, GlobalAction::Theme)
        {
            return Ok(ThemeEvent::Cancelled.into());
        }

        Ok(match self.list.handle_key(key)? {
            EventResult::Event(ListEvent::Activated(info)) => ThemeEvent::Selected(info).into(),
            EventResult::Ignored => EventResult::Ignored,
            EventResult::Consumed | EventResult::Event(ListEvent::Changed(_)) => {
                EventResult::Consumed
            }
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(40), Constraint::Length(8));
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Theme ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()))
            .style(Style::default().bg(theme.base()));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);
        self.list.render(frame, inner, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_lookup() {
        assert_eq!(theme_from_name("Catppuccin Latte"), Theme::from_catppuccin(&PALETTE.latte));
        assert_eq!(theme_from_name("does not exist"), Theme::default());
    }
}
