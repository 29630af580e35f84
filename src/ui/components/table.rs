use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Paragraph, Row, Table as RatatuiTable, TableState,
};

use crate::Theme;
use crate::config::{KeyResolver, NavAction, SearchAction};
use crate::search::filter_indices;
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 10;

pub enum TableEvent<T> {
    Activated(T),
    SearchChanged(String),
}

pub struct ColumnDef {
    pub header: &'static str,
    pub constraint: Constraint,
}

impl ColumnDef {
    pub const fn new(header: &'static str, constraint: Constraint) -> Self {
        Self { header, constraint }
    }
}

pub trait TableRow {
    fn columns() -> &'static [ColumnDef];

    /// Cells of the row shown at `position`, the 1-based index in the visible rows.
    fn render_cells(&self, position: usize, theme: &Theme) -> Vec<Cell<'static>>;

    /// Text the search query is matched against.
    fn search_key(&self) -> &str;
}

/// Selectable table with an optional search filter.
///
/// The visible rows are always the items whose [`TableRow::search_key`]
/// contains the query, in their original order.
pub struct Table<T: TableRow + Clone> {
    items: Vec<T>,
    filtered_indices: Vec<usize>,
    state: TableState,
    title: Option<String>,
    empty_message: &'static str,
    searchable: bool,
    searching: bool,
    query: String,
    resolver: Arc<KeyResolver>,
}

impl<T: TableRow + Clone> Table<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut table = Self {
            items,
            filtered_indices: Vec::new(),
            state: TableState::default(),
            title: None,
            empty_message: "Nothing here yet",
            searchable: false,
            searching: false,
            query: String::new(),
            resolver,
        };
        table.update_filter();
        table
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn with_empty_message(mut self, message: &'static str) -> Self {
        self.empty_message = message;
        self
    }

    #[must_use]
    pub const fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Replace the items, keeping the current query applied.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.update_filter();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    /// Items currently shown, in display order.
    pub fn visible_items(&self) -> impl Iterator<Item = &T> {
        self.filtered_indices.iter().map(|&i| &self.items[i])
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.state
            .selected()
            .and_then(|selected| self.filtered_indices.get(selected))
            .and_then(|&idx| self.items.get(idx))
    }

    fn update_filter(&mut self) {
        self.filtered_indices = filter_indices(&self.items, &self.query, T::search_key);

        if self.filtered_indices.is_empty() {
            self.state.select(None);
        } else if self
            .state
            .selected()
            .is_none_or(|i| i >= self.filtered_indices.len())
        {
            self.state.select(Some(0));
        }
    }

    fn select(&mut self, index: usize) {
        if let Some(last) = self.filtered_indices.len().checked_sub(1) {
            self.state.select(Some(index.min(last)));
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        // Esc leaves search mode and clears the filter
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            self.searching = false;
            if self.query.is_empty() {
                return EventResult::Consumed;
            }
            self.query.clear();
            self.update_filter();
            return TableEvent::SearchChanged(String::new()).into();
        }

        // Enter leaves search mode but keeps the filter
        if self.resolver.matches_nav(&key, NavAction::Select) {
            self.searching = false;
            return EventResult::Consumed;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Backspace, _) => {
                self.query.pop();
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.query.push(c),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.query.clear(),
            _ => return EventResult::Consumed,
        }
        self.update_filter();
        TableEvent::SearchChanged(self.query.clone()).into()
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        let current = self.state.selected().unwrap_or(0);

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.select(current + 1);
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            self.select(current.saturating_sub(1));
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            self.select(0);
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            self.select(usize::MAX);
        } else if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.select(current + PAGE_STEP);
        } else if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.select(current.saturating_sub(PAGE_STEP));
        } else if self.resolver.matches_nav(&key, NavAction::Select) {
            return self
                .selected_item()
                .map_or(EventResult::Ignored, |item| {
                    TableEvent::Activated(item.clone()).into()
                });
        } else if self.searchable && self.resolver.matches_search(&key, SearchAction::Toggle) {
            self.searching = true;
        } else if self.searchable
            && !self.query.is_empty()
            && self.resolver.matches_search(&key, SearchAction::Exit)
        {
            self.query.clear();
            self.update_filter();
            return TableEvent::SearchChanged(String::new()).into();
        } else {
            return EventResult::Ignored;
        }
        EventResult::Consumed
    }
}

impl<T: TableRow + Clone> Component for Table<T> {
    type Output = TableEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(if self.searching {
            self.handle_search_key(key)
        } else {
            self.handle_navigation_key(key)
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let has_search_bar = self.searching || !self.query.is_empty();
        let (table_area, search_area) = if has_search_bar {
            let [table_area, search_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
            (table_area, Some(search_area))
        } else {
            (area, None)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()))
            .title(self.title.clone().unwrap_or_default())
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            );

        if self.filtered_indices.is_empty() {
            let message = if self.query.is_empty() {
                self.empty_message.to_string()
            } else {
                format!("No matches for \"{}\"", self.query)
            };
            let paragraph = Paragraph::new(message)
                .style(Style::default().fg(theme.overlay0()))
                .block(block);
            frame.render_widget(paragraph, table_area);
        } else {
            let columns = T::columns();
            let header = Row::new(columns.iter().map(|c| {
                Cell::from(c.header).style(
                    Style::default()
                        .fg(theme.header())
                        .add_modifier(Modifier::BOLD),
                )
            }))
            .style(Style::default().bg(theme.surface0()));

            let rows = self
                .filtered_indices
                .iter()
                .enumerate()
                .map(|(position, &idx)| {
                    Row::new(self.items[idx].render_cells(position + 1, theme))
                        .style(Style::default().fg(theme.text()))
                });

            let table = RatatuiTable::new(rows, columns.iter().map(|c| c.constraint))
                .header(header)
                .block(block)
                .row_highlight_style(
                    Style::default()
                        .bg(theme.selection_bg())
                        .fg(theme.lavender())
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");

            frame.render_stateful_widget(table, table_area, &mut self.state);
        }

        if let Some(search_area) = search_area {
            let (text, style) = if self.searching {
                (format!("/{}_", self.query), Style::default().fg(theme.yellow()))
            } else {
                (
                    format!("/{} ({} matches)", self.query, self.filtered_indices.len()),
                    Style::default().fg(theme.subtext0()),
                )
            };
            frame.render_widget(Paragraph::new(text).style(style), search_area);
        }
    }
}
