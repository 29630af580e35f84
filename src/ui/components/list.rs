use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{List as RatatuiList, ListItem, ListState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result};

pub enum ListEvent<T> {
    Changed(T),
    Activated(T),
}

pub trait ListRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static>;
}

/// Plain selectable list without search.
pub struct List<T: ListRow + Clone> {
    items: Vec<T>,
    state: ListState,
    resolver: Arc<KeyResolver>,
}

impl<T: ListRow + Clone> List<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            items,
            state,
            resolver,
        }
    }

    fn changed(&self, before: Option<usize>) -> EventResult<ListEvent<T>> {
        match self.state.selected() {
            Some(selected) if Some(selected) != before => self
                .items
                .get(selected)
                .map_or(EventResult::Consumed, |item| {
                    ListEvent::Changed(item.clone()).into()
                }),
            _ => EventResult::Consumed,
        }
    }
}

impl<T: ListRow + Clone> Component for List<T> {
    type Output = ListEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let before = self.state.selected();

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.state.select_next();
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            self.state.select_previous();
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            self.state.select_first();
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            self.state.select_last();
        } else if self.resolver.matches_nav(&key, NavAction::Select) {
            return Ok(before
                .and_then(|i| self.items.get(i))
                .map_or(EventResult::Ignored, |item| {
                    ListEvent::Activated(item.clone()).into()
                }));
        } else {
            return Ok(EventResult::Ignored);
        }

        Ok(self.changed(before))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items: Vec<ListItem> = self.items.iter().map(|i| i.render_row(theme)).collect();

        let list = RatatuiList::new(items)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}
