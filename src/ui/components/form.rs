use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::Theme;
use crate::config::{FormAction, KeyResolver};
use crate::ui::{Component, EventResult, Result, TextInput};

const FIELD_HEIGHT: u16 = 3;

pub enum FormEvent {
    Submitted,
    Cancelled,
}

/// A vertical stack of text fields with one focused field.
pub struct Form {
    fields: Vec<TextInput>,
    focused: usize,
    resolver: Arc<KeyResolver>,
}

impl Form {
    pub fn new(fields: Vec<TextInput>, resolver: Arc<KeyResolver>) -> Self {
        let mut form = Self {
            fields,
            focused: 0,
            resolver,
        };
        form.focus(0);
        form
    }

    /// Value of the field at `index`, empty if there is no such field.
    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", TextInput::value)
    }

    pub const fn focused(&self) -> usize {
        self.focused
    }

    pub fn field(&self, index: usize) -> Option<&TextInput> {
        self.fields.get(index)
    }

    /// Height needed to render every field.
    pub fn height(&self) -> u16 {
        u16::try_from(self.fields.len())
            .unwrap_or(u16::MAX)
            .saturating_mul(FIELD_HEIGHT)
    }

    pub fn focus(&mut self, index: usize) {
        if index >= self.fields.len() {
            return;
        }
        self.focused = index;
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.set_focused(i == index);
        }
    }

    fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus((self.focused + 1) % self.fields.len());
        }
    }

    fn focus_previous(&mut self) {
        if !self.fields.is_empty() {
            let len = self.fields.len();
            self.focus((self.focused + len - 1) % len);
        }
    }
}

impl Component for Form {
    type Output = FormEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_form(&key, FormAction::Submit) {
            return Ok(FormEvent::Submitted.into());
        }
        if self.resolver.matches_form(&key, FormAction::Cancel) {
            return Ok(FormEvent::Cancelled.into());
        }
        if self.resolver.matches_form(&key, FormAction::Next) {
            self.focus_next();
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::Previous) {
            self.focus_previous();
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::ToggleVisibility) {
            let toggled = self
                .fields
                .get_mut(self.focused)
                .is_some_and(TextInput::toggle_visibility);
            return Ok(if toggled {
                EventResult::Consumed
            } else {
                EventResult::Ignored
            });
        }

        match self.fields.get_mut(self.focused) {
            Some(field) => Ok(match field.handle_key(key)? {
                EventResult::Ignored => EventResult::Ignored,
                EventResult::Consumed | EventResult::Event(()) => EventResult::Consumed,
            }),
            None => Ok(EventResult::Ignored),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let areas = Layout::vertical(
            self.fields
                .iter()
                .map(|_| Constraint::Length(FIELD_HEIGHT)),
        )
        .split(area);

        for (field, field_area) in self.fields.iter_mut().zip(areas.iter()) {
            field.render(frame, *field_area, theme);
        }
    }
}
