pub mod components;
pub mod widgets;

mod alert;
mod status_bar;
mod toast;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use color_eyre::Result;

use crate::Theme;

pub use components::{
    ColumnDef, ConfirmDialog, ConfirmEvent, Form, FormEvent, List, ListEvent, ListRow, Table,
    TableEvent, TableRow, TextInput,
};
pub use widgets::Spinner;

pub use alert::{AlertDialog, AlertEvent};
pub use status_bar::{Keybinding, STATUS_BAR_HEIGHT, StatusBar, StatusLine};
pub use toast::{Toast, ToastManager, ToastType};

/// Result of handling an input event.
///
/// - `Ignored` - The handler didn't recognize this input, the parent should process it
/// - `Consumed` - The input was handled but produced no event
/// - `Event(E)` - The input was handled and produced an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    Ignored,
    Consumed,
    Event(E),
}

impl<E> EventResult<E> {
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Interactive UI building block.
///
/// Components are reusable widgets that handle input events and emit
/// generic outputs. They know nothing about services or accounts.
pub trait Component {
    type Output;

    /// Handle a key event.
    ///
    /// # Errors
    /// Returns an error if handling the key failed.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Called on each tick for animations and time-based updates.
    fn handle_tick(&mut self) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}
